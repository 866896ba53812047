//! Account domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use unitec_portal_core::{
    ApprovalStatus, Email, GraduationStatus, Role, StudentId, UserId, graduation_status,
};

/// A portal account (domain type).
#[derive(Debug, Clone)]
pub struct Account {
    /// Unique account ID.
    pub id: UserId,
    /// Sign-in email address.
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    /// Normalized student ID; only present on institutional accounts.
    pub student_id: Option<StudentId>,
    pub year_group: Option<String>,
    pub graduation_date: Option<NaiveDate>,
    /// Derived from the email domain at creation.
    pub is_institutional_email: bool,
    pub approval_status: ApprovalStatus,
    pub role: Role,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Full name as shown in lists.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Build the JSON view for this account as of `today`.
    #[must_use]
    pub fn view(&self, window_months: u32, today: NaiveDate) -> AccountView {
        let graduation = graduation_status(self.graduation_date, window_months, today);

        AccountView {
            id: self.id,
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            full_name: self.full_name(),
            student_id: self.student_id.clone(),
            role: self.role,
            year_group: self.year_group.clone(),
            approval_status: self.approval_status,
            approval_status_display: self.approval_status.label(),
            is_institutional_email: self.is_institutional_email,
            is_institutional_email_display: if self.is_institutional_email {
                "Unitec"
            } else {
                "Non-Unitec"
            },
            graduation_date: self.graduation_date,
            graduation_status: graduation,
            graduation_status_display: graduation.label(window_months),
            created_at: self.created_at,
        }
    }
}

/// Account as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub id: UserId,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub student_id: Option<StudentId>,
    pub role: Role,
    pub year_group: Option<String>,
    pub approval_status: ApprovalStatus,
    pub approval_status_display: &'static str,
    pub is_institutional_email: bool,
    pub is_institutional_email_display: &'static str,
    pub graduation_date: Option<NaiveDate>,
    pub graduation_status: GraduationStatus,
    pub graduation_status_display: String,
    pub created_at: DateTime<Utc>,
}

/// One page of the admin account list.
#[derive(Debug, Clone, Serialize)]
pub struct AccountPage {
    /// Total accounts matching the filters.
    pub count: i64,
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
    pub results: Vec<AccountView>,
}
