//! Admin dashboard account management handlers.
//!
//! Listing with filters, per-account approval decisions, and the bulk
//! approve / deny / extend-graduation actions. Every handler requires an
//! administrator session.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use unitec_portal_core::{ApprovalStatus, UserId};

use crate::db::accounts::{AccountQuery, AccountRepository, PAGE_SIZE};
use crate::error::{AppError, Result};
use crate::extract::ValidJson;
use crate::middleware::RequireAdmin;
use crate::models::{AccountPage, AccountView};
use crate::services::{AccountService, BulkOutcome};
use crate::state::AppState;

/// Body of the bulk action endpoints.
#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    pub ids: Vec<UserId>,
}

impl BulkRequest {
    fn ids(&self) -> Result<&[UserId]> {
        if self.ids.is_empty() {
            return Err(AppError::BadRequest("No users selected.".to_owned()));
        }
        Ok(&self.ids)
    }
}

/// Body of the single-account approval endpoint.
#[derive(Debug, Deserialize)]
pub struct ApprovalChange {
    pub approval_status: ApprovalStatus,
}

/// List accounts, newest first.
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<AccountQuery>,
) -> Result<Json<AccountPage>> {
    let today = state.today();
    let window = state.graduation_window_months();

    let (accounts, count) = AccountRepository::new(state.pool())
        .list(&query, today)
        .await?;

    Ok(Json(AccountPage {
        count,
        page: query.page(),
        page_size: PAGE_SIZE,
        results: accounts.iter().map(|a| a.view(window, today)).collect(),
    }))
}

/// Show one account.
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<Json<AccountView>> {
    let account = AccountRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("account {id}")))?;

    Ok(Json(
        account.view(state.graduation_window_months(), state.today()),
    ))
}

/// Record an administrator's approval decision for one account.
pub async fn set_approval(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<UserId>,
    ValidJson(change): ValidJson<ApprovalChange>,
) -> Result<Json<AccountView>> {
    let account = AccountRepository::new(state.pool())
        .set_approval_status_one(id, change.approval_status)
        .await?;
    tracing::info!(
        admin_id = %admin.id,
        user_id = %id,
        approval_status = %change.approval_status,
        "Approval status set"
    );

    Ok(Json(
        account.view(state.graduation_window_months(), state.today()),
    ))
}

/// Approve every selected account.
pub async fn approve(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidJson(request): ValidJson<BulkRequest>,
) -> Result<Json<BulkOutcome>> {
    let outcome = AccountService::new(state.pool())
        .set_approval(request.ids()?, ApprovalStatus::Approved)
        .await?;

    Ok(Json(outcome))
}

/// Deny every selected account.
pub async fn deny(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidJson(request): ValidJson<BulkRequest>,
) -> Result<Json<BulkOutcome>> {
    let outcome = AccountService::new(state.pool())
        .set_approval(request.ids()?, ApprovalStatus::Denied)
        .await?;

    Ok(Json(outcome))
}

/// Give every selected graduated account one more year from today.
pub async fn extend_graduation(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ValidJson(request): ValidJson<BulkRequest>,
) -> Result<Json<BulkOutcome>> {
    let outcome = AccountService::new(state.pool())
        .extend_graduation(request.ids()?, state.today())
        .await?;

    Ok(Json(outcome))
}
