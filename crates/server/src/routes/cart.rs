//! Cart route handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireSession;
use crate::models::Item;
use crate::services::{CartController, Operation, Outcome, dispatch};
use crate::state::AppState;

use super::items::IdQuery;

/// Put item `id` in the cart.
#[instrument(skip(state, session), fields(username = %session.username()))]
pub async fn add(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    Query(query): Query<IdQuery>,
) -> Result<Outcome> {
    let cart = state.cart().clone();
    let id = query.item_id();
    let item_id = id.clone();

    let outcome = dispatch(Operation::CartAddition, async move {
        cart.add(&session, &id).await
    })
    .wait()
    .await?;

    if outcome.is_success() {
        add_breadcrumb("cart", "Added item to cart", Some(&[("item_id", item_id.as_str())]));
    }
    Ok(outcome)
}

/// Take item `id` out of the cart.
#[instrument(skip(state, session), fields(username = %session.username()))]
pub async fn remove(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
    Query(query): Query<IdQuery>,
) -> Result<Outcome> {
    let cart = state.cart().clone();
    let id = query.item_id();

    let outcome = dispatch(Operation::CartRemoval, async move {
        cart.remove(&session, &id).await
    })
    .wait()
    .await?;
    Ok(outcome)
}

/// Items in the cart, most recently purchased first.
pub async fn load(RequireSession(session): RequireSession) -> Json<Vec<Item>> {
    let account = session.lock().await;
    Json(CartController::contents(&account))
}

/// Empty the cart.
#[instrument(skip(state, session), fields(username = %session.username()))]
pub async fn clear(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
) -> Result<Outcome<usize>> {
    let cart = state.cart().clone();

    let outcome = dispatch(Operation::CartClear, async move { cart.clear(&session).await })
        .wait()
        .await?;
    Ok(outcome)
}

/// Record a purchase of everything in the cart.
#[instrument(skip(state, session), fields(username = %session.username()))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireSession(session): RequireSession,
) -> Result<Outcome<usize>> {
    let cart = state.cart().clone();

    let outcome = dispatch(Operation::CartCheckout, async move {
        cart.checkout(&session).await
    })
    .wait()
    .await?;

    if let Some(count) = outcome.value() {
        add_breadcrumb("cart", "Checked out", Some(&[("items", count.to_string().as_str())]));
    }
    Ok(outcome)
}
