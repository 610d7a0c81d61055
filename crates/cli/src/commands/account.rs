//! Account management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create an account directly (no session is opened)
//! restock-cli account create -u robin -p 'correct horse'
//!
//! # Dump an account's items, most recent purchase first
//! restock-cli account items -u robin
//! ```
//!
//! # Environment Variables
//!
//! - `RESTOCK_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use thiserror::Error;

use restock_core::{Username, UsernameError};
use restock_server::db::{PersistenceGateway, PgGateway, RepositoryError};
use restock_server::services::{ItemStore, ServiceError, create_account};

use super::{CommandError, database_url};

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Config(#[from] CommandError),

    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Document store error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("No account named {0}")]
    NotFound(Username),

    #[error("Failed to encode items: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Create a new account.
///
/// Uses the same validation, hashing and duplicate check as registration.
///
/// # Errors
///
/// Returns an error if the username is taken or invalid, or the store fails.
pub async fn create(username: &str, password: &str) -> Result<(), AccountError> {
    let gateway = PgGateway::new(&database_url()?)?;

    tracing::info!("Creating account: {}", username.trim());
    let account = create_account(&gateway, username, password).await?;

    tracing::info!("Account {} created", account.username);
    Ok(())
}

/// Print an account's items as pretty JSON, most recent purchase first.
///
/// # Errors
///
/// Returns an error if the account does not exist or the store fails.
pub async fn items(username: &str) -> Result<(), AccountError> {
    let username = Username::parse(username)?;
    let gateway = PgGateway::new(&database_url()?)?;

    let account = gateway
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AccountError::NotFound(username.clone()))?;

    let json = serde_json::to_string_pretty(&ItemStore::list(&account))?;

    #[allow(clippy::print_stdout)]
    {
        println!("{json}");
    }

    tracing::info!("{} items for {}", account.items.len(), username);
    Ok(())
}
