//! Authentication route handlers.
//!
//! Self-service registration and session login/logout.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tower_sessions::Session;

use unitec_portal_core::RegistrationInput;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::extract::ValidJson;
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{AccountView, CurrentUser};
use crate::services::AuthService;
use crate::state::AppState;

/// Login request body.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Register a new student account.
///
/// Institutional emails are approved immediately; everyone else starts as
/// pending until an administrator decides.
pub async fn register(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<RegistrationInput>,
) -> Result<(StatusCode, Json<AccountView>)> {
    let auth = AuthService::new(state.pool(), state.domains());
    let account = auth.register(&input).await?;

    Ok((
        StatusCode::CREATED,
        Json(account.view(state.graduation_window_months(), state.today())),
    ))
}

/// Log in with email and password and start a session.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ValidJson(request): ValidJson<LoginRequest>,
) -> Result<Json<AccountView>> {
    let auth = AuthService::new(state.pool(), state.domains());
    let account = auth.login(&request.email, &request.password).await?;

    let current = CurrentUser::from(&account);
    set_current_user(&session, &current).await?;
    set_sentry_user(&account.id, Some(account.email.as_str()));
    tracing::info!(user_id = %account.id, "Login successful");

    Ok(Json(
        account.view(state.graduation_window_months(), state.today()),
    ))
}

/// End the current session.
pub async fn logout(session: Session) -> Result<impl IntoResponse> {
    clear_current_user(&session).await?;
    clear_sentry_user();

    Ok(StatusCode::NO_CONTENT)
}
