//! Session extractors.
//!
//! The cookie session holds only a [`SessionToken`]; [`RequireSession`]
//! resolves it against the [`SessionManager`](crate::services::SessionManager).

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use restock_core::SessionToken;

use crate::error::AppError;
use crate::models::session_keys;
use crate::services::{ActiveSession, ServiceError};
use crate::state::AppState;

/// Extractor that requires a logged-in session.
///
/// Rejects with 401 `No active session, please log in` when the cookie has no
/// token or the token has expired.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireSession(session): RequireSession) -> String {
///     format!("Hello, {}!", session.username())
/// }
/// ```
pub struct RequireSession(pub ActiveSession);

impl FromRequestParts<AppState> for RequireSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Internal("session layer missing".to_owned()))?;

        let token = current_token(session)
            .await?
            .ok_or(ServiceError::NoActiveSession)?;

        let active = state.sessions().session(&token).await?;
        Ok(Self(active))
    }
}

/// Read the session token from the cookie session, if any.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn current_token(
    session: &Session,
) -> Result<Option<SessionToken>, tower_sessions::session::Error> {
    session.get(session_keys::SESSION_TOKEN).await
}

/// Store the session token after login or registration.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_session_token(
    session: &Session,
    token: SessionToken,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::SESSION_TOKEN, token).await
}

/// Remove the session token (logout), returning it if one was set.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_session_token(
    session: &Session,
) -> Result<Option<SessionToken>, tower_sessions::session::Error> {
    session
        .remove::<SessionToken>(session_keys::SESSION_TOKEN)
        .await
}
