//! Item catalog operations.

use std::sync::Arc;

use tracing::instrument;

use restock_core::ItemId;

use crate::db::{PersistenceGateway, RepositoryError};
use crate::models::{Item, ItemDraft, ItemProfile, UserAccount, sort_by_recency};

use super::sessions::ActiveSession;
use super::{ServiceError, persist_or_revert};

/// Creates, edits and deletes items in a session's account.
#[derive(Clone)]
pub struct ItemStore {
    gateway: Arc<dyn PersistenceGateway>,
}

impl ItemStore {
    #[must_use]
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }

    /// Add a new item and persist the account.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::DuplicateName` if an item already has this name
    /// or slug, and `ServiceError::Persistence` if the save failed (the
    /// account is left as it was).
    #[instrument(skip(self, session, draft), fields(username = %session.username(), item_id = %draft.id()))]
    pub async fn create(
        &self,
        session: &ActiveSession,
        draft: ItemDraft,
    ) -> Result<ItemId, ServiceError> {
        let mut account = session.lock().await;

        persist_or_revert(self.gateway.as_ref(), &mut account, |acct| {
            let id = draft.id();
            if acct.has_item_named(&draft.name) || acct.item(&id).is_some() {
                return Err(ServiceError::DuplicateName);
            }
            acct.items.push(Item::from_draft(draft));
            Ok(id)
        })
        .await
    }

    /// Overwrite every authored field of item `id`.
    ///
    /// The id is recomputed from the new name, so a rename changes the item's
    /// identity. The cart flag is kept. Returns the item's (possibly new) id.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if there is no item `id`,
    /// `ServiceError::DuplicateName` if the new name collides with another
    /// item, and `ServiceError::Persistence` if the save failed.
    #[instrument(skip(self, session, draft), fields(username = %session.username(), item_id = %id))]
    pub async fn update(
        &self,
        session: &ActiveSession,
        id: &ItemId,
        draft: ItemDraft,
    ) -> Result<ItemId, ServiceError> {
        let mut account = session.lock().await;

        persist_or_revert(self.gateway.as_ref(), &mut account, |acct| {
            if acct.item(id).is_none() {
                return Err(ServiceError::NotFound);
            }
            let new_id = draft.id();
            if &new_id != id && acct.item(&new_id).is_some() {
                return Err(ServiceError::DuplicateName);
            }
            let item = acct.item_mut(id).ok_or(ServiceError::NotFound)?;
            item.apply(draft);
            Ok(new_id)
        })
        .await
    }

    /// Remove item `id` and persist the account.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if there is no item `id`, and
    /// `ServiceError::Persistence` if the save failed (the item is kept).
    #[instrument(skip(self, session), fields(username = %session.username(), item_id = %id))]
    pub async fn delete(&self, session: &ActiveSession, id: &ItemId) -> Result<(), ServiceError> {
        let mut account = session.lock().await;

        persist_or_revert(self.gateway.as_ref(), &mut account, |acct| {
            let index = acct.position(id).ok_or(ServiceError::NotFound)?;
            acct.items.remove(index);
            Ok(())
        })
        .await
    }

    /// Look up one item.
    #[must_use]
    pub fn get(account: &UserAccount, id: &ItemId) -> Option<Item> {
        account.item(id).cloned()
    }

    /// Every item, most recently purchased first.
    #[must_use]
    pub fn list(account: &UserAccount) -> Vec<Item> {
        let mut items = account.items.clone();
        sort_by_recency(&mut items);
        items
    }

    /// The profile view of item `id`, for display or an edit form.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the account has no such item.
    pub fn profile(account: &UserAccount, id: &ItemId) -> Result<ItemProfile, ServiceError> {
        let item = account.item(id).ok_or(ServiceError::NotFound)?;
        ItemProfile::from_item(item).map_err(|e| RepositoryError::from(e).into())
    }
}
