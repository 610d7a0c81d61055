//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions cookie holding the session token)
//! 5. Rate limiting on `/accounts` (governor)

pub mod auth;
pub mod form;
pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use auth::{RequireSession, clear_session_token, current_token, set_session_token};
pub use form::FormData;
pub use rate_limit::account_rate_limiter;
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
