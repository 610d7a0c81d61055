//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Document store reachability
//!
//! # Accounts (rate limited)
//! POST /accounts/register      - Create account and log in
//! POST /accounts/login         - Log in
//! POST /accounts/logout        - Log out
//! GET  /accounts/state         - Session state (JSON)
//!
//! # Items (requires session)
//! POST /items/load             - Purchase history (JSON)
//! GET  /items/profile?id=      - One item (JSON)
//! POST /items/create           - Create item (form)
//! POST /items/update?id=       - Edit item (form)
//! POST /items/delete?id=       - Delete item
//!
//! # Cart (requires session)
//! POST /cart/add?id=           - Put item in cart
//! POST /cart/remove?id=        - Take item out of cart
//! POST /cart/load              - Cart contents (JSON)
//! POST /cart/clear             - Empty cart
//! POST /cart/checkout          - Record purchase of cart contents
//! ```

pub mod accounts;
pub mod cart;
pub mod health;
pub mod items;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::account_rate_limiter;
use crate::state::AppState;

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        .route("/logout", post(accounts::logout))
        .route("/state", get(accounts::state))
}

/// Create the item routes router.
pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/load", post(items::load))
        .route("/profile", get(items::profile))
        .route("/create", post(items::create))
        .route("/update", post(items::update))
        .route("/delete", post(items::delete))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/load", post(cart::load))
        .route("/clear", post(cart::clear))
        .route("/checkout", post(cart::checkout))
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    build(account_routes())
}

/// Create all routes, with the account routes rate limited per client IP.
///
/// Needs the peer address, so serve with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn rate_limited_routes() -> Router<AppState> {
    build(account_routes().layer(account_rate_limiter()))
}

fn build(accounts: Router<AppState>) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/accounts", accounts)
        .nest("/items", item_routes())
        .nest("/cart", cart_routes())
}
