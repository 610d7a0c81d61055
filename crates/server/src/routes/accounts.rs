//! Account route handlers: register, login, logout, session state.

use axum::{Json, extract::State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use restock_core::SessionToken;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{FormData, clear_session_token, current_token, set_session_token};
use crate::services::{Operation, Outcome, SessionStatus, dispatch};
use crate::state::AppState;

/// Register and login form data.
#[derive(Deserialize)]
pub struct CredentialsForm {
    #[serde(rename = "Username")]
    pub username: String,
    #[serde(rename = "Password")]
    pub password: String,
}

impl std::fmt::Debug for CredentialsForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Handle registration.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    FormData(form): FormData<CredentialsForm>,
) -> Result<Outcome<SessionToken>> {
    let username = form.username.clone();
    let outcome = dispatch(Operation::Registration, async move {
        state
            .sessions()
            .register(&form.username, &form.password)
            .await
    })
    .wait()
    .await?;

    if let Some(token) = outcome.value() {
        set_session_token(&session, *token).await?;
        set_sentry_user(&username);
    }

    Ok(outcome)
}

/// Handle login.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    FormData(form): FormData<CredentialsForm>,
) -> Result<Outcome<SessionToken>> {
    let username = form.username.clone();
    let outcome = dispatch(Operation::Login, async move {
        state.sessions().login(&form.username, &form.password).await
    })
    .wait()
    .await?;

    match outcome.value() {
        Some(token) => {
            set_session_token(&session, *token).await?;
            set_sentry_user(&username);
        }
        None => tracing::warn!("Login failed"),
    }

    Ok(outcome)
}

/// Handle logout. Always succeeds, with or without a session.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<&'static str> {
    if let Some(token) = clear_session_token(&session).await? {
        state.sessions().logout(&token).await;
    }

    if let Err(e) = session.flush().await {
        tracing::warn!(error = %e, "Failed to flush session on logout");
    }
    clear_sentry_user();

    Ok("success")
}

/// Report whether the caller is logged in.
pub async fn state(State(state): State<AppState>, session: Session) -> Result<Json<SessionStatus>> {
    let token = current_token(&session).await?;
    Ok(Json(state.sessions().state(token.as_ref()).await))
}
