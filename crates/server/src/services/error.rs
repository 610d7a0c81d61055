//! Service-level error types.

use thiserror::Error;

use restock_core::UsernameError;

use crate::db::RepositoryError;
use crate::models::ItemFormError;

/// Errors that can occur in session, item and cart operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Username is already registered.
    #[error("account already exists")]
    AlreadyExists,

    /// Wrong username or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Another item already has this name (or the id derived from it).
    #[error("an item with this name already exists")]
    DuplicateName,

    /// The referenced item does not exist in the account.
    #[error("item not found")]
    NotFound,

    /// The request has no (or an expired) session.
    #[error("no active session")]
    NoActiveSession,

    /// Malformed username.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// Malformed item form.
    #[error("invalid item: {0}")]
    InvalidItem(#[from] ItemFormError),

    /// Password missing or otherwise unusable.
    #[error("invalid password: {0}")]
    InvalidPassword(String),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Document store error; in-memory state has been restored.
    #[error("persistence error: {0}")]
    Persistence(#[from] RepositoryError),
}

impl ServiceError {
    /// Whether the failure is the server's fault rather than the caller's.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::PasswordHash)
    }
}
