//! Restock purchase history service.
//!
//! This crate provides the service as a library, allowing the router to be
//! driven in-process by tests and the services to be reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the application router without rate limiting.
pub fn app(state: AppState) -> Router {
    with_layers(routes::routes(), state)
}

/// Build the application router with the account routes rate limited.
pub fn rate_limited_app(state: AppState) -> Router {
    with_layers(routes::rate_limited_routes(), state)
}

fn with_layers(routes: Router<AppState>, state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    routes
        .layer(session_layer)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
