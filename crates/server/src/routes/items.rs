//! Item route handlers.
//!
//! Mutations are dispatched as their own task and the handler waits on the
//! operation's completion, which carries the single result message.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use restock_core::ItemId;

use crate::error::Result;
use crate::middleware::{FormData, RequireSession};
use crate::models::{Item, ItemDraft, ItemForm, ItemProfile};
use crate::services::{ItemStore, Operation, Outcome, ServiceError, dispatch};
use crate::state::AppState;

/// `?id=` query parameter naming an item.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: String,
}

impl IdQuery {
    #[must_use]
    pub fn item_id(&self) -> ItemId {
        ItemId::new(self.id.as_str())
    }
}

/// List every item, most recently purchased first.
pub async fn load(RequireSession(session): RequireSession) -> Json<Vec<Item>> {
    let account = session.lock().await;
    Json(ItemStore::list(&account))
}

/// Show one item.
#[instrument(skip(session), fields(username = %session.username()))]
pub async fn profile(
    RequireSession(session): RequireSession,
    Query(query): Query<IdQuery>,
) -> Result<Json<ItemProfile>> {
    let account = session.lock().await;
    let profile = ItemStore::profile(&account, &query.item_id())?;
    Ok(Json(profile))
}

/// Create an item from the authoring form.
#[instrument(skip(state, session, form), fields(username = %session.username()))]
pub async fn create(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    FormData(form): FormData<ItemForm>,
) -> Result<Outcome<ItemId>> {
    let draft = ItemDraft::parse(form).map_err(ServiceError::from)?;
    let items = state.items().clone();

    let outcome = dispatch(Operation::Entry, async move {
        items.create(&session, draft).await
    })
    .wait()
    .await?;
    Ok(outcome)
}

/// Overwrite item `id` from the authoring form.
#[instrument(skip(state, session, form), fields(username = %session.username()))]
pub async fn update(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    Query(query): Query<IdQuery>,
    FormData(form): FormData<ItemForm>,
) -> Result<Outcome<ItemId>> {
    let draft = ItemDraft::parse(form).map_err(ServiceError::from)?;
    let items = state.items().clone();
    let id = query.item_id();

    let outcome = dispatch(Operation::Update, async move {
        items.update(&session, &id, draft).await
    })
    .wait()
    .await?;
    Ok(outcome)
}

/// Delete item `id`.
#[instrument(skip(state, session), fields(username = %session.username()))]
pub async fn delete(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    Query(query): Query<IdQuery>,
) -> Result<Outcome> {
    let items = state.items().clone();
    let id = query.item_id();

    let outcome = dispatch(Operation::Delete, async move {
        items.delete(&session, &id).await
    })
    .wait()
    .await?;
    Ok(outcome)
}
