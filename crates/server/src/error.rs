//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Error bodies are JSON: field errors as `{"field": ["message"]}`, everything
//! else as `{"detail": "message"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use unitec_portal_core::ValidationErrors;

use crate::db::RepositoryError;
use crate::services::{AuthError, ProfileError};

/// Message returned when registering an email that is already taken.
const DUPLICATE_EMAIL: &str = "user with this email already exists.";

/// Application-level error type for the portal server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request body failed field or cross-field validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Account is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body is not JSON.
    #[error("Unsupported media type")]
    UnsupportedMediaType,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ProfileError> for AppError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::Validation(errors) => Self::Validation(errors),
            ProfileError::Repository(RepositoryError::NotFound) => {
                Self::NotFound("account".to_owned())
            }
            ProfileError::Repository(other) => Self::Database(other),
        }
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Internal(format!("session error: {err}"))
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
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Auth(err) => match err {
                AuthError::Validation(_) | AuthError::UserAlreadyExists => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        };

        // Don't expose internal error details to clients
        let body = match self {
            Self::Validation(errors) | Self::Auth(AuthError::Validation(errors)) => json!(errors),
            Self::Auth(AuthError::UserAlreadyExists) => json!({ "email": [DUPLICATE_EMAIL] }),
            Self::Auth(AuthError::InvalidCredentials) => {
                json!({ "detail": "No active account found with the given credentials" })
            }
            Self::Database(RepositoryError::NotFound) => json!({ "detail": "Not found." }),
            Self::Database(_) | Self::Internal(_) | Self::Auth(_) => {
                json!({ "detail": "Internal server error" })
            }
            Self::NotFound(what) => json!({ "detail": format!("Not found: {what}") }),
            Self::Unauthorized(msg) | Self::BadRequest(msg) => json!({ "detail": msg }),
            Self::UnsupportedMediaType => {
                json!({ "detail": "Request body must be sent as application/json." })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl AppError {
    /// Whether this error is a server-side fault (reported to Sentry).
    fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(
                RepositoryError::Database(_)
                    | RepositoryError::DataCorruption(_)
                    | RepositoryError::Conflict(_)
            ) | Self::Internal(_)
                | Self::Auth(AuthError::Repository(_) | AuthError::PasswordHash)
        )
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from an account ID.
///
/// Call this after successful authentication to associate errors with accounts.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the account.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
