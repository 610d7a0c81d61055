//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`
//! or an [`Outcome`], which renders as the operation's single message.

use std::borrow::Cow;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::services::outcome::client_message;
use crate::services::{CompletionError, Outcome, ServiceError};

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// A service operation failed outside of a completion.
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// The cookie session could not be read or written.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// An operation ended without reporting its outcome.
    #[error("Completion error: {0}")]
    Completion(#[from] CompletionError),

    /// A request body could not be read as a form.
    #[error("Invalid form: {0}")]
    InvalidForm(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// HTTP status for a service failure.
#[must_use]
pub const fn service_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::AlreadyExists | ServiceError::DuplicateName => StatusCode::CONFLICT,
        ServiceError::InvalidCredentials | ServiceError::NoActiveSession => {
            StatusCode::UNAUTHORIZED
        }
        ServiceError::NotFound => StatusCode::NOT_FOUND,
        ServiceError::InvalidUsername(_)
        | ServiceError::InvalidItem(_)
        | ServiceError::InvalidPassword(_) => StatusCode::BAD_REQUEST,
        ServiceError::PasswordHash | ServiceError::Persistence(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Service(err) => err.is_server_error(),
            Self::Session(_) | Self::Completion(_) | Self::Internal(_) => true,
            Self::InvalidForm(_) => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Service(err) => service_status(err),
            Self::InvalidForm(_) => StatusCode::BAD_REQUEST,
            Self::Session(_) | Self::Completion(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Service(err) => {
                client_message(err).map_or_else(|| INTERNAL_MESSAGE.to_owned(), Cow::into_owned)
            }
            Self::InvalidForm(msg) => msg.clone(),
            Self::Session(_) | Self::Completion(_) | Self::Internal(_) => {
                INTERNAL_MESSAGE.to_owned()
            }
        };

        (status, message).into_response()
    }
}

impl<T> IntoResponse for Outcome<T> {
    fn into_response(self) -> Response {
        let message = self.message().into_owned();

        let Some(err) = self.error() else {
            return (StatusCode::OK, message).into_response();
        };

        if err.is_server_error() {
            let event_id = sentry::capture_error(err);
            tracing::error!(
                error = %err,
                event = self.operation().event_name(),
                sentry_event_id = %event_id,
                "Operation failed"
            );
        }

        (service_status(err), message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(username: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item to cart", Some(&[("item_id", "oat-milk")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::RepositoryError;
    use crate::models::ItemFormError;
    use crate::services::Operation;

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::InvalidForm("Missing field `ItemName`".to_string());
        assert_eq!(err.to_string(), "Invalid form: Missing field `ItemName`");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(ServiceError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(ServiceError::NoActiveSession.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::InvalidForm("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_detail_is_hidden() {
        let err = AppError::from(ServiceError::Persistence(RepositoryError::Unavailable(
            "db-host-7 refused".to_owned(),
        )));
        let text = body_text(err.into_response()).await;
        assert_eq!(text, "Internal server error");
    }

    #[tokio::test]
    async fn test_validation_message_matches_outcome() {
        let err = || ServiceError::InvalidItem(ItemFormError::EmptyName);
        let outcome: Outcome = Outcome::new(Operation::Entry, Err(err()));
        let expected = outcome.message().into_owned();
        assert_eq!(expected, "Item name cannot be empty");

        let response = AppError::from(err()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, expected);
    }

    #[tokio::test]
    async fn test_outcome_success_response() {
        let response = Outcome::new(Operation::CartClear, Ok(2_usize)).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Cart cleared successfully");
    }

    #[tokio::test]
    async fn test_outcome_failure_response() {
        let outcome: Outcome = Outcome::new(
            Operation::Update,
            Err(ServiceError::Persistence(RepositoryError::NotFound)),
        );
        let response = outcome.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_text(response).await,
            "An error has occured in the update process. The item has been restored to its previous state"
        );

        let outcome: Outcome = Outcome::new(Operation::Entry, Err(ServiceError::DuplicateName));
        let response = outcome.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_text(response).await, "Item already exists");
    }
}
