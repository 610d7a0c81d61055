//! Session-related types.
//!
//! Only the opaque [`SessionToken`](restock_core::SessionToken) is stored in
//! the cookie session. The account state it points at lives in the
//! [`SessionManager`](crate::services::sessions::SessionManager).

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the active session token.
    pub const SESSION_TOKEN: &str = "session_token";
}
