//! `PostgreSQL` account documents.
//!
//! Accounts live in `restock.account` as one JSONB document per row, keyed by
//! username. A fresh `PgConnection` is opened for every logical operation.

use std::str::FromStr;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgConnectOptions;
use sqlx::types::Json;
use sqlx::{Connection, PgConnection};

use restock_core::Username;

use super::{GatewayConnection, PersistenceGateway, RepositoryError};
use crate::models::UserAccount;

/// Gateway that opens one `PostgreSQL` connection per operation.
pub struct PgGateway {
    options: PgConnectOptions,
}

impl PgGateway {
    /// Create a gateway from a connection URL.
    ///
    /// No connection is opened here.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the URL is malformed.
    pub fn new(database_url: &SecretString) -> Result<Self, RepositoryError> {
        let options = PgConnectOptions::from_str(database_url.expose_secret())?;
        Ok(Self { options })
    }
}

#[async_trait]
impl PersistenceGateway for PgGateway {
    async fn connect(&self) -> Result<Box<dyn GatewayConnection>, RepositoryError> {
        let conn = PgConnection::connect_with(&self.options).await?;
        Ok(Box::new(PgAccountConnection { conn }))
    }
}

/// Account repository bound to a single open connection.
struct PgAccountConnection {
    conn: PgConnection,
}

#[async_trait]
impl GatewayConnection for PgAccountConnection {
    async fn find_by_username(
        &mut self,
        username: &Username,
    ) -> Result<Option<UserAccount>, RepositoryError> {
        let document = sqlx::query_scalar::<_, Json<UserAccount>>(
            r"
            SELECT document
            FROM restock.account
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(&mut self.conn)
        .await?;

        match document {
            Some(Json(account)) if &account.username != username => {
                Err(RepositoryError::DataCorruption(format!(
                    "document for {username} carries username {}",
                    account.username
                )))
            }
            Some(Json(account)) => Ok(Some(account)),
            None => Ok(None),
        }
    }

    async fn insert(&mut self, account: &UserAccount) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO restock.account (username, document)
            VALUES ($1, $2)
            ",
        )
        .bind(&account.username)
        .bind(Json(account))
        .execute(&mut self.conn)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("username already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(())
    }

    async fn save(&mut self, account: &UserAccount) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE restock.account
            SET document = $2, updated_at = now()
            WHERE username = $1
            ",
        )
        .bind(&account.username)
        .bind(Json(account))
        .execute(&mut self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), RepositoryError> {
        self.conn.close().await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_parses_url_without_connecting() {
        let url = SecretString::from("postgres://restock:pw@localhost:5432/restock");
        assert!(PgGateway::new(&url).is_ok());
    }

    #[test]
    fn test_new_rejects_malformed_url() {
        let url = SecretString::from("not a url");
        assert!(matches!(
            PgGateway::new(&url),
            Err(RepositoryError::Database(_))
        ));
    }
}
