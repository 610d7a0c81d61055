//! Session management.
//!
//! Sessions are keyed by an opaque [`SessionToken`] and expire after a week
//! without use. Every session on the same account shares one in-memory copy
//! of the account behind an async mutex, so operations on that account are
//! serialized and each one's revert scope is its own.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, Weak};
use std::time::Duration;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use moka::future::Cache;
use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};
use tracing::instrument;

use restock_core::{SessionState, SessionToken, Username};

use crate::db::{GatewayConnection, PersistenceGateway, RepositoryError, close_quietly};
use crate::models::UserAccount;

use super::ServiceError;

/// Sessions unused for this long are dropped.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Upper bound on concurrently held sessions.
const MAX_SESSIONS: u64 = 100_000;

/// Longest accepted password, in bytes.
const MAX_PASSWORD_LENGTH: usize = 1024;

type SharedAccount = Arc<Mutex<UserAccount>>;

/// A logged-in session and the account it operates on.
#[derive(Clone)]
pub struct ActiveSession {
    username: Username,
    account: SharedAccount,
}

impl std::fmt::Debug for ActiveSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveSession")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl ActiveSession {
    /// The account's username.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Lock the account for the duration of one operation.
    pub async fn lock(&self) -> MutexGuard<'_, UserAccount> {
        self.account.lock().await
    }
}

/// What `/accounts/state` reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<Username>,
}

/// Owns every active session.
pub struct SessionManager {
    gateway: Arc<dyn PersistenceGateway>,
    sessions: Cache<SessionToken, ActiveSession>,
    accounts: std::sync::Mutex<HashMap<Username, Weak<Mutex<UserAccount>>>>,
}

impl SessionManager {
    /// Create a manager with no sessions.
    #[must_use]
    pub fn new(gateway: Arc<dyn PersistenceGateway>) -> Self {
        Self::with_idle_timeout(gateway, SESSION_IDLE_TIMEOUT)
    }

    /// Create a manager whose sessions expire after `idle` without use.
    #[must_use]
    pub fn with_idle_timeout(gateway: Arc<dyn PersistenceGateway>, idle: Duration) -> Self {
        let sessions = Cache::builder()
            .max_capacity(MAX_SESSIONS)
            .time_to_idle(idle)
            .build();

        Self {
            gateway,
            sessions,
            accounts: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Create an account and log it in.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::AlreadyExists` if the username is taken, a
    /// validation error for an empty username or password, and
    /// `ServiceError::Persistence` if the store fails.
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<SessionToken, ServiceError> {
        let account = create_account(self.gateway.as_ref(), username, password).await?;
        tracing::info!(username = %account.username, "Account registered");

        let token = self.open_session(account).await;
        Ok(token)
    }

    /// Check credentials and open a session.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidCredentials` if there is no such account
    /// or the password is wrong, and `ServiceError::Persistence` if the store
    /// fails.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<SessionToken, ServiceError> {
        let username = Username::parse(username)?;
        if password.is_empty() {
            return Err(ServiceError::InvalidPassword(
                "password cannot be empty".to_owned(),
            ));
        }

        let account = self
            .gateway
            .find_by_username(&username)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        verify_password(password, &account.password_hash)?;

        let token = self.open_session(account).await;
        tracing::info!(username = %username, "Logged in");
        Ok(token)
    }

    /// End a session. Unknown tokens are ignored.
    pub async fn logout(&self, token: &SessionToken) {
        if let Some(session) = self.sessions.remove(token).await {
            tracing::info!(username = %session.username, "Logged out");
        }
    }

    /// Look up the session for `token`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NoActiveSession` if the token is unknown or has
    /// expired.
    pub async fn session(&self, token: &SessionToken) -> Result<ActiveSession, ServiceError> {
        self.sessions
            .get(token)
            .await
            .ok_or(ServiceError::NoActiveSession)
    }

    /// Report whether `token` (if any) belongs to a live session.
    pub async fn state(&self, token: Option<&SessionToken>) -> SessionStatus {
        let session = match token {
            Some(token) => self.sessions.get(token).await,
            None => None,
        };

        match session {
            Some(session) => SessionStatus {
                state: SessionState::LoggedIn,
                username: Some(session.username),
            },
            None => SessionStatus {
                state: SessionState::LoggedOut,
                username: None,
            },
        }
    }

    async fn open_session(&self, account: UserAccount) -> SessionToken {
        let username = account.username.clone();
        let account = self.share_account(account);
        let token = SessionToken::generate();

        self.sessions
            .insert(token, ActiveSession { username, account })
            .await;
        token
    }

    /// Reuse the live copy of an account if another session holds one.
    fn share_account(&self, loaded: UserAccount) -> SharedAccount {
        let mut accounts = self
            .accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(live) = accounts.get(&loaded.username).and_then(Weak::upgrade) {
            return live;
        }

        accounts.retain(|_, weak| weak.strong_count() > 0);
        let username = loaded.username.clone();
        let shared = Arc::new(Mutex::new(loaded));
        accounts.insert(username, Arc::downgrade(&shared));
        shared
    }
}

/// Create and store a new account on a single connection.
///
/// # Errors
///
/// Returns `ServiceError::AlreadyExists` if the username is taken, a
/// validation error for bad input, and `ServiceError::Persistence` if the
/// store fails.
pub async fn create_account(
    gateway: &dyn PersistenceGateway,
    username: &str,
    password: &str,
) -> Result<UserAccount, ServiceError> {
    let username = Username::parse(username)?;
    validate_password(password)?;

    let mut conn = gateway.connect().await?;
    let result = insert_new_account(conn.as_mut(), username, password).await;
    close_quietly(conn).await;
    result
}

async fn insert_new_account(
    conn: &mut dyn GatewayConnection,
    username: Username,
    password: &str,
) -> Result<UserAccount, ServiceError> {
    if conn.find_by_username(&username).await?.is_some() {
        return Err(ServiceError::AlreadyExists);
    }

    let account = UserAccount::new(username, hash_password(password)?);
    conn.insert(&account).await.map_err(|e| match e {
        RepositoryError::Conflict(_) => ServiceError::AlreadyExists,
        other => ServiceError::Persistence(other),
    })?;

    Ok(account)
}

fn validate_password(password: &str) -> Result<(), ServiceError> {
    if password.is_empty() {
        return Err(ServiceError::InvalidPassword(
            "password cannot be empty".to_owned(),
        ));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ServiceError::InvalidPassword(format!(
            "password must be at most {MAX_PASSWORD_LENGTH} bytes"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| ServiceError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), ServiceError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| ServiceError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| ServiceError::InvalidCredentials)
}
