//! CLI subcommands.

pub mod account;
pub mod migrate;

use secrecy::SecretString;
use thiserror::Error;

/// Errors shared by commands that talk to the document store.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// The URL selects the in-memory store, which a separate process cannot see.
    #[error("{0} points at the in-memory store; the CLI needs a PostgreSQL URL")]
    MemoryStore(&'static str),
}

/// Read `RESTOCK_DATABASE_URL`, falling back to `DATABASE_URL`.
///
/// Loads `.env` if present.
///
/// # Errors
///
/// Returns an error if neither variable is set, or if the URL selects the
/// in-memory store.
pub fn database_url() -> Result<SecretString, CommandError> {
    dotenvy::dotenv().ok();

    let (key, value) = std::env::var("RESTOCK_DATABASE_URL")
        .map(|v| ("RESTOCK_DATABASE_URL", v))
        .or_else(|_| std::env::var("DATABASE_URL").map(|v| ("DATABASE_URL", v)))
        .map_err(|_| CommandError::MissingEnvVar("RESTOCK_DATABASE_URL"))?;

    if value.starts_with(restock_server::config::MEMORY_DATABASE_SCHEME) {
        return Err(CommandError::MemoryStore(key));
    }

    Ok(SecretString::from(value))
}
