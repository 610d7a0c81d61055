//! Persistence gateway for account documents.
//!
//! # Document store
//!
//! Each account is one document with its items embedded. Every logical
//! operation opens its own connection, performs a single read or write and
//! closes the connection again; there is no pooling.
//!
//! ## Backends
//!
//! - [`accounts::PgGateway`] - `PostgreSQL`, documents in `restock.account` (JSONB)
//! - [`memory::MemoryGateway`] - process-local map, used for development and tests
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p restock-cli -- migrate
//! ```

pub mod accounts;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use restock_core::Username;

use crate::config::{ServerConfig, StorageBackend};
use crate::models::UserAccount;

pub use accounts::PgGateway;
pub use memory::MemoryGateway;

/// Errors from the document store.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// The store could not be reached or refused the write.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The document to update does not exist.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// One open connection to the document store.
#[async_trait]
pub trait GatewayConnection: Send {
    /// Fetch the account document for `username`.
    async fn find_by_username(
        &mut self,
        username: &Username,
    ) -> Result<Option<UserAccount>, RepositoryError>;

    /// Store a new account document.
    ///
    /// Fails with `RepositoryError::Conflict` if the username is taken.
    async fn insert(&mut self, account: &UserAccount) -> Result<(), RepositoryError>;

    /// Replace an existing account document.
    async fn save(&mut self, account: &UserAccount) -> Result<(), RepositoryError>;

    /// Close the connection.
    async fn close(self: Box<Self>) -> Result<(), RepositoryError>;
}

/// Connection factory for the document store.
///
/// The provided methods each wrap a single operation in connect, run, close.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Open a new connection.
    async fn connect(&self) -> Result<Box<dyn GatewayConnection>, RepositoryError>;

    /// Look up an account on its own connection.
    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserAccount>, RepositoryError> {
        let mut conn = self.connect().await?;
        let result = conn.find_by_username(username).await;
        close_quietly(conn).await;
        result
    }

    /// Insert an account on its own connection.
    async fn insert_account(&self, account: &UserAccount) -> Result<(), RepositoryError> {
        let mut conn = self.connect().await?;
        let result = conn.insert(account).await;
        close_quietly(conn).await;
        result
    }

    /// Save an account on its own connection.
    async fn save_account(&self, account: &UserAccount) -> Result<(), RepositoryError> {
        let mut conn = self.connect().await?;
        let result = conn.save(account).await;
        close_quietly(conn).await;
        result
    }

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.connect().await?.close().await
    }
}

/// Close a connection, logging rather than propagating a failure.
///
/// The operation that ran on the connection has already produced its result.
pub async fn close_quietly(conn: Box<dyn GatewayConnection>) {
    if let Err(e) = conn.close().await {
        tracing::warn!(error = %e, "Failed to close document store connection");
    }
}

/// Build the gateway selected by the configuration.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the `PostgreSQL` URL cannot be parsed.
pub fn create_gateway(
    config: &ServerConfig,
) -> Result<Arc<dyn PersistenceGateway>, RepositoryError> {
    match config.storage_backend() {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory document store; data is lost on restart");
            Ok(Arc::new(MemoryGateway::new()))
        }
        StorageBackend::Postgres => Ok(Arc::new(PgGateway::new(&config.database_url)?)),
    }
}
