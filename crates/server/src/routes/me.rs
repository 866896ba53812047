//! Current-account route handlers.

use axum::{Json, extract::State};

use unitec_portal_core::ProfileUpdateInput;

use crate::db::AccountRepository;
use crate::error::{AppError, Result};
use crate::extract::ValidJson;
use crate::middleware::RequireAuth;
use crate::models::{Account, AccountView, CurrentUser};
use crate::services::AccountService;
use crate::state::AppState;

/// Load the session's account, treating a vanished row as logged out.
async fn load_account(state: &AppState, user: &CurrentUser) -> Result<Account> {
    AccountRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("account no longer exists".to_owned()))
}

/// Show the logged-in account.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<AccountView>> {
    let account = load_account(&state, &user).await?;

    Ok(Json(
        account.view(state.graduation_window_months(), state.today()),
    ))
}

/// Edit profile fields of the logged-in account.
///
/// Email, approval status, and the institutional flag are not editable here.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ValidJson(input): ValidJson<ProfileUpdateInput>,
) -> Result<Json<AccountView>> {
    let account = load_account(&state, &user).await?;
    let updated = AccountService::new(state.pool())
        .update_profile(&account, &input)
        .await?;

    Ok(Json(
        updated.view(state.graduation_window_months(), state.today()),
    ))
}
