//! Account administration and profile service.
//!
//! Bulk admin actions and profile edits. None of these recompute derived
//! account fields; approval changes here are administrator decisions.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use tracing::instrument;

use unitec_portal_core::{
    ApprovalStatus, ProfileUpdateInput, UserId, ValidationErrors, extended_graduation_date,
    validate_profile_update,
};

use crate::db::RepositoryError;
use crate::db::accounts::AccountRepository;
use crate::models::account::Account;

/// Result of a bulk admin action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    /// Number of accounts changed.
    pub updated: u64,
    /// Confirmation shown to the administrator.
    pub message: String,
}

impl BulkOutcome {
    fn status_change(updated: u64, status: ApprovalStatus) -> Self {
        Self {
            updated,
            message: format!("Successfully {} {updated} user(s).", status.verb()),
        }
    }

    fn graduation_extended(updated: u64) -> Self {
        Self {
            updated,
            message: format!("Successfully extended {updated} graduated user(s)."),
        }
    }
}

/// Errors from profile updates.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Account administration service.
pub struct AccountService<'a> {
    accounts: AccountRepository<'a>,
}

impl<'a> AccountService<'a> {
    /// Create a new account service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            accounts: AccountRepository::new(pool),
        }
    }

    /// Set the approval status of every listed account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn set_approval(
        &self,
        ids: &[UserId],
        status: ApprovalStatus,
    ) -> Result<BulkOutcome, RepositoryError> {
        let updated = self.accounts.set_approval_status(ids, status).await?;
        tracing::info!(updated, %status, "Bulk approval status change");

        Ok(BulkOutcome::status_change(updated, status))
    }

    /// Give every listed graduated account another year from `today`.
    ///
    /// Accounts without a graduation date are skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn extend_graduation(
        &self,
        ids: &[UserId],
        today: NaiveDate,
    ) -> Result<BulkOutcome, RepositoryError> {
        let new_date = extended_graduation_date(today);
        let updated = self.accounts.extend_graduation(ids, new_date).await?;
        tracing::info!(updated, %new_date, "Graduation dates extended");

        Ok(BulkOutcome::graduation_extended(updated))
    }

    /// Validate and apply a profile edit for `account`.
    ///
    /// The student ID rule is checked against the stored institutional flag.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Validation` for invalid input, or
    /// `ProfileError::Repository` if the update fails.
    #[instrument(skip_all, fields(user_id = %account.id))]
    pub async fn update_profile(
        &self,
        account: &Account,
        input: &ProfileUpdateInput,
    ) -> Result<Account, ProfileError> {
        let update = validate_profile_update(input, account.is_institutional_email)?;
        if update.is_noop() {
            return Ok(account.clone());
        }

        Ok(self.accounts.update_profile(account.id, &update).await?)
    }
}
