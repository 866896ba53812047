//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a logged-in account, or an administrator,
//! in route handlers.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::db::AccountRepository;
use crate::models::session::keys;
use crate::models::{Account, CurrentUser};
use crate::state::AppState;

/// Extractor that requires an authenticated account.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires an authenticated administrator
/// (`admin` or `super_admin`).
///
/// The role is read from the account row on every request, so a demotion
/// takes effect without waiting for the session to expire.
pub struct RequireAdmin(pub CurrentUser);

/// Error returned when an extractor rejects the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No logged-in account.
    Unauthorized,
    /// Logged in, but the role is not allowed.
    Forbidden,
    /// The account could not be loaded.
    Unavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication credentials were not provided.",
            ),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                "You do not have permission to perform this action.",
            ),
            Self::Unavailable => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        let user: CurrentUser = session
            .get(keys::CURRENT_USER)
            .await
            .ok()
            .flatten()
            .ok_or(AuthRejection::Unauthorized)?;

        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;

        let account = AccountRepository::new(state.pool())
            .get_by_id(user.id)
            .await
            .map_err(|e| {
                tracing::error!(user_id = %user.id, error = %e, "Failed to load account");
                AuthRejection::Unavailable
            })?;

        admin_identity(account.as_ref()).map(Self)
    }
}

/// Current identity of `account` if it may use the admin API.
fn admin_identity(account: Option<&Account>) -> Result<CurrentUser, AuthRejection> {
    let account = account.ok_or(AuthRejection::Unauthorized)?;

    if !account.role.is_admin() {
        tracing::warn!(user_id = %account.id, role = %account.role, "Admin access denied");
        return Err(AuthRejection::Forbidden);
    }

    Ok(CurrentUser::from(account))
}

/// Helper to set the current account in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    // Rotate the session ID on login
    session.cycle_id().await?;
    session.insert(keys::CURRENT_USER, user).await
}

/// Helper to end the current session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
