//! Cart operations.
//!
//! The cart is not a separate collection: it is the set of items whose
//! `in_cart` flag is set. Checkout stamps every item in the cart with the
//! same purchase time and empties the cart in one save.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::instrument;

use restock_core::ItemId;

use crate::db::PersistenceGateway;
use crate::models::{Item, UserAccount, sort_by_recency};

use super::sessions::ActiveSession;
use super::{ServiceError, persist_or_revert};

/// Moves items in and out of a session's cart.
#[derive(Clone)]
pub struct CartController {
    gateway: Arc<dyn PersistenceGateway>,
}

impl CartController {
    #[must_use]
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self { gateway }
    }

    /// Put item `id` in the cart.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if there is no item `id`, and
    /// `ServiceError::Persistence` if the save failed.
    #[instrument(skip(self, session), fields(username = %session.username(), item_id = %id))]
    pub async fn add(&self, session: &ActiveSession, id: &ItemId) -> Result<(), ServiceError> {
        self.set_in_cart(session, id, true).await
    }

    /// Take item `id` out of the cart.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if there is no item `id`, and
    /// `ServiceError::Persistence` if the save failed.
    #[instrument(skip(self, session), fields(username = %session.username(), item_id = %id))]
    pub async fn remove(&self, session: &ActiveSession, id: &ItemId) -> Result<(), ServiceError> {
        self.set_in_cart(session, id, false).await
    }

    /// Empty the cart. Returns how many items were in it.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Persistence` if the save failed.
    #[instrument(skip(self, session), fields(username = %session.username()))]
    pub async fn clear(&self, session: &ActiveSession) -> Result<usize, ServiceError> {
        let mut account = session.lock().await;

        persist_or_revert(self.gateway.as_ref(), &mut account, |acct| {
            let mut cleared = 0;
            for item in acct.items.iter_mut().filter(|item| item.in_cart) {
                item.in_cart = false;
                cleared += 1;
            }
            Ok(cleared)
        })
        .await
    }

    /// Record a purchase of everything in the cart, stamped with the current
    /// time.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Persistence` if the save failed; neither the
    /// cart nor any purchase date changes in that case.
    pub async fn checkout(&self, session: &ActiveSession) -> Result<usize, ServiceError> {
        self.checkout_at(session, Utc::now()).await
    }

    /// Record a purchase of everything in the cart at `now`.
    ///
    /// Returns how many items were purchased.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Persistence` if the save failed.
    #[instrument(skip(self, session), fields(username = %session.username()))]
    pub async fn checkout_at(
        &self,
        session: &ActiveSession,
        now: DateTime<Utc>,
    ) -> Result<usize, ServiceError> {
        let mut account = session.lock().await;

        let purchased = persist_or_revert(self.gateway.as_ref(), &mut account, |acct| {
            let mut purchased = 0;
            for item in acct.items.iter_mut().filter(|item| item.in_cart) {
                item.in_cart = false;
                item.last_purchased = now;
                purchased += 1;
            }
            Ok(purchased)
        })
        .await?;

        tracing::info!(purchased, "Checkout recorded");
        Ok(purchased)
    }

    /// Items in the cart, most recently purchased first.
    #[must_use]
    pub fn contents(account: &UserAccount) -> Vec<Item> {
        let mut items: Vec<Item> = account
            .items
            .iter()
            .filter(|item| item.in_cart)
            .cloned()
            .collect();
        sort_by_recency(&mut items);
        items
    }

    async fn set_in_cart(
        &self,
        session: &ActiveSession,
        id: &ItemId,
        in_cart: bool,
    ) -> Result<(), ServiceError> {
        let mut account = session.lock().await;

        persist_or_revert(self.gateway.as_ref(), &mut account, |acct| {
            let item = acct.item_mut(id).ok_or(ServiceError::NotFound)?;
            item.in_cart = in_cart;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::db::MemoryGateway;
    use crate::models::{ItemDraft, ItemForm};
    use crate::services::ItemStore;
    use crate::services::test_support::logged_in;

    async fn setup() -> (MemoryGateway, CartController, ActiveSession, ItemId, ItemId) {
        let (gateway, session) = logged_in("jordan").await;
        let items = ItemStore::new(Arc::new(gateway.clone()));
        let cart = CartController::new(Arc::new(gateway.clone()));

        let mut ids = Vec::new();
        for (name, date) in [("coffee", "2024-01-10"), ("bread", "2024-02-20")] {
            let draft = ItemDraft::parse(ItemForm {
                item_name: name.to_owned(),
                links: String::new(),
                description: String::new(),
                comments: String::new(),
                last_purchased: date.to_owned(),
                image_data_url: String::new(),
            })
            .unwrap();
            ids.push(items.create(&session, draft).await.unwrap());
        }
        let bread = ids.pop().unwrap();
        let coffee = ids.pop().unwrap();
        (gateway, cart, session, coffee, bread)
    }

    #[tokio::test]
    async fn test_add_and_remove() {
        let (gateway, cart, session, coffee, _) = setup().await;

        cart.add(&session, &coffee).await.unwrap();
        assert_eq!(CartController::contents(&*session.lock().await).len(), 1);
        let stored = gateway.document(session.username()).unwrap().unwrap();
        assert_eq!(stored.cart_len(), 1);

        cart.remove(&session, &coffee).await.unwrap();
        assert!(CartController::contents(&*session.lock().await).is_empty());
    }

    #[tokio::test]
    async fn test_add_missing_item_not_found() {
        let (_, cart, session, _, _) = setup().await;
        assert!(matches!(
            cart.add(&session, &ItemId::new("milk")).await,
            Err(ServiceError::NotFound)
        ));
        assert!(matches!(
            cart.remove(&session, &ItemId::new("milk")).await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_add_failure_restores_cart() {
        let (gateway, cart, session, coffee, _) = setup().await;
        gateway.fail_next_write();

        assert!(cart.add(&session, &coffee).await.is_err());
        assert_eq!(session.lock().await.cart_len(), 0);
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let (_, cart, session, coffee, bread) = setup().await;
        cart.add(&session, &coffee).await.unwrap();
        cart.add(&session, &bread).await.unwrap();

        assert_eq!(cart.clear(&session).await.unwrap(), 2);
        let once = session.lock().await.clone();
        assert_eq!(cart.clear(&session).await.unwrap(), 0);
        assert_eq!(*session.lock().await, once);
        assert_eq!(once.cart_len(), 0);
    }

    #[tokio::test]
    async fn test_clear_failure_restores_cart() {
        let (gateway, cart, session, coffee, bread) = setup().await;
        cart.add(&session, &coffee).await.unwrap();
        cart.add(&session, &bread).await.unwrap();
        gateway.fail_next_write();

        assert!(cart.clear(&session).await.is_err());
        assert_eq!(session.lock().await.cart_len(), 2);
    }

    #[tokio::test]
    async fn test_checkout_stamps_only_cart_items() {
        let (gateway, cart, session, coffee, bread) = setup().await;
        cart.add(&session, &coffee).await.unwrap();
        let bread_before = ItemStore::get(&*session.lock().await, &bread).unwrap();

        let now = Utc.with_ymd_and_hms(2024, 9, 1, 18, 30, 0).unwrap();
        assert_eq!(cart.checkout_at(&session, now).await.unwrap(), 1);

        let account = session.lock().await;
        let coffee = ItemStore::get(&account, &coffee).unwrap();
        assert!(!coffee.in_cart);
        assert_eq!(coffee.last_purchased, now);
        assert_eq!(ItemStore::get(&account, &bread).unwrap(), bread_before);

        let stored = gateway.document(session.username()).unwrap().unwrap();
        assert_eq!(stored, *account);
    }

    #[tokio::test]
    async fn test_checkout_uses_one_timestamp() {
        let (_, cart, session, coffee, bread) = setup().await;
        cart.add(&session, &coffee).await.unwrap();
        cart.add(&session, &bread).await.unwrap();

        cart.checkout(&session).await.unwrap();

        let account = session.lock().await;
        let a = ItemStore::get(&account, &coffee).unwrap().last_purchased;
        let b = ItemStore::get(&account, &bread).unwrap().last_purchased;
        assert_eq!(a, b);
        assert_eq!(account.cart_len(), 0);
    }

    #[tokio::test]
    async fn test_checkout_failure_restores_cart_and_dates() {
        let (gateway, cart, session, coffee, bread) = setup().await;
        cart.add(&session, &coffee).await.unwrap();
        cart.add(&session, &bread).await.unwrap();
        let before = session.lock().await.clone();
        gateway.fail_next_write();

        let result = cart.checkout(&session).await;
        assert!(matches!(result, Err(ServiceError::Persistence(_))));
        assert_eq!(*session.lock().await, before);
    }

    #[tokio::test]
    async fn test_contents_sorted_descending() {
        let (_, cart, session, coffee, bread) = setup().await;
        cart.add(&session, &coffee).await.unwrap();
        cart.add(&session, &bread).await.unwrap();

        let names: Vec<_> = CartController::contents(&*session.lock().await)
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(names, ["bread", "coffee"]);
    }

    #[tokio::test]
    async fn test_concurrent_mutations_revert_only_their_own_change() {
        let (gateway, cart, session, coffee, bread) = setup().await;
        cart.add(&session, &bread).await.unwrap();
        let bread_before = session.lock().await.item(&bread).cloned().unwrap();

        gateway.fail_next_write();
        let other = session.clone();
        let (checkout, add) = tokio::join!(cart.checkout(&session), cart.add(&other, &coffee));

        // Checkout takes the account lock first and meets the rejected write
        assert!(matches!(checkout, Err(ServiceError::Persistence(_))));
        add.unwrap();

        let account = session.lock().await;
        assert_eq!(account.item(&bread), Some(&bread_before));
        assert!(account.item(&coffee).unwrap().in_cart);
        assert_eq!(CartController::contents(&account).len(), 2);

        let stored = gateway.document(session.username()).unwrap().unwrap();
        assert_eq!(stored, *account);
    }
}
