//! Account repository for database operations.
//!
//! Queries are built at runtime (`query_as` / `QueryBuilder`) because the
//! admin list composes its `WHERE` clause from optional filters.
//!
//! `is_institutional_email` and `approval_status` are written by
//! [`AccountRepository::create`] from a [`NewAccount`]; profile updates never
//! touch them, and only the approval methods change the status afterwards.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use unitec_portal_core::{
    ApprovalStatus, Email, EmailDomainFilter, GraduationFilter, GraduationRange, NewAccount,
    ProfileUpdate, Role, StudentId, UserId,
};

use super::RepositoryError;
use crate::models::account::Account;

/// Accounts per page in the admin list.
pub const PAGE_SIZE: u32 = 25;

const ACCOUNT_COLUMNS: &str = "id, email, first_name, last_name, student_id, year_group, \
     graduation_date, is_institutional_email, approval_status, role, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` account queries.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: i32,
    email: String,
    first_name: String,
    last_name: String,
    student_id: Option<String>,
    year_group: Option<String>,
    graduation_date: Option<NaiveDate>,
    is_institutional_email: bool,
    approval_status: ApprovalStatus,
    role: Role,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let student_id = row
            .student_id
            .as_deref()
            .map(StudentId::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid student id in database: {e}"))
            })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            first_name: row.first_name,
            last_name: row.last_name,
            student_id,
            year_group: row.year_group,
            graduation_date: row.graduation_date,
            is_institutional_email: row.is_institutional_email,
            approval_status: row.approval_status,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Account row joined with its password hash (login only).
#[derive(Debug, sqlx::FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    account: AccountRow,
    password_hash: String,
}

// =============================================================================
// Admin list query
// =============================================================================

/// Filters, search, and paging for the admin account list.
///
/// Deserializes directly from the query string
/// (`?approval_status=pending&graduation_status=expired&page=2`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccountQuery {
    pub approval_status: Option<ApprovalStatus>,
    pub role: Option<Role>,
    pub email_domain: Option<EmailDomainFilter>,
    pub graduation_status: Option<GraduationFilter>,
    /// Case-insensitive substring of email, names, or student ID.
    pub search: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
}

impl AccountQuery {
    /// Requested page, clamped to at least 1.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(PAGE_SIZE)
    }

    /// `ILIKE` pattern for the search term, or `None` when blank.
    fn search_pattern(&self) -> Option<String> {
        let term = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let escaped = term
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        Some(format!("%{escaped}%"))
    }
}

/// Append the `WHERE` clause for `query` to `builder`.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &AccountQuery, today: NaiveDate) {
    builder.push(" WHERE TRUE");

    if let Some(status) = query.approval_status {
        builder.push(" AND approval_status = ").push_bind(status);
    }
    if let Some(role) = query.role {
        builder.push(" AND role = ").push_bind(role);
    }
    if let Some(domain) = query.email_domain {
        builder
            .push(" AND is_institutional_email = ")
            .push_bind(domain.institutional_flag());
    }
    if let Some(filter) = query.graduation_status {
        match filter.range(today) {
            GraduationRange::Unset => {
                builder.push(" AND graduation_date IS NULL");
            }
            GraduationRange::Between { from, to } => {
                builder
                    .push(" AND graduation_date >= ")
                    .push_bind(from)
                    .push(" AND graduation_date <= ")
                    .push_bind(to);
            }
            GraduationRange::Before(day) => {
                builder.push(" AND graduation_date < ").push_bind(day);
            }
        }
    }
    if let Some(pattern) = query.search_pattern() {
        builder.push(" AND (");
        let mut columns = builder.separated(" OR ");
        for column in ["email", "first_name", "last_name", "student_id"] {
            columns
                .push(format!("{column} ILIKE "))
                .push_bind_unseparated(pattern.clone());
        }
        builder.push(")");
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for account database operations.
pub struct AccountRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new account.
    ///
    /// Derived fields are persisted exactly as computed by the factory.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        account: &NewAccount,
        password_hash: &str,
    ) -> Result<Account, RepositoryError> {
        let sql = format!(
            "INSERT INTO portal.account (email, password_hash, first_name, last_name, \
             student_id, year_group, graduation_date, is_institutional_email, \
             approval_status, role) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {ACCOUNT_COLUMNS}"
        );

        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(account.email())
            .bind(password_hash)
            .bind(account.first_name())
            .bind(account.last_name())
            .bind(account.student_id().map(StudentId::as_str))
            .bind(account.year_group())
            .bind(account.graduation_date())
            .bind(account.is_institutional_email())
            .bind(account.approval_status())
            .bind(account.role())
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict("email already exists".to_owned());
                }
                RepositoryError::Database(e)
            })?;

        row.try_into()
    }

    /// Get an account by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored data is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<Account>, RepositoryError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM portal.account WHERE id = $1");

        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get an account together with its password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored data is invalid.
    pub async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS}, password_hash FROM portal.account WHERE email = $1"
        );

        let row = sqlx::query_as::<_, CredentialsRow>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        row.map(|r| Ok((Account::try_from(r.account)?, r.password_hash)))
            .transpose()
    }

    /// Apply a validated profile change.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<Account, RepositoryError> {
        let mut builder = profile_update_query(id, update);

        let row = builder
            .build_query_as::<AccountRow>()
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Set the approval status of every listed account.
    ///
    /// Returns the number of accounts updated; unknown IDs are skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_approval_status(
        &self,
        ids: &[UserId],
        status: ApprovalStatus,
    ) -> Result<u64, RepositoryError> {
        let ids: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();

        let result = sqlx::query(
            "UPDATE portal.account SET approval_status = $1, updated_at = NOW() \
             WHERE id = ANY($2)",
        )
        .bind(status)
        .bind(&ids)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Set the approval status of a single account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_approval_status_one(
        &self,
        id: UserId,
        status: ApprovalStatus,
    ) -> Result<Account, RepositoryError> {
        let sql = format!(
            "UPDATE portal.account SET approval_status = $1, updated_at = NOW() \
             WHERE id = $2 RETURNING {ACCOUNT_COLUMNS}"
        );

        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(status)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Move the graduation date of every listed account to `new_date`.
    ///
    /// Accounts without a graduation date are left alone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn extend_graduation(
        &self,
        ids: &[UserId],
        new_date: NaiveDate,
    ) -> Result<u64, RepositoryError> {
        let ids: Vec<i32> = ids.iter().map(|id| id.as_i32()).collect();

        let result = sqlx::query(
            "UPDATE portal.account SET graduation_date = $1, updated_at = NOW() \
             WHERE id = ANY($2) AND graduation_date IS NOT NULL",
        )
        .bind(new_date)
        .bind(&ids)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// List one page of accounts matching `query`, newest first.
    ///
    /// Returns the page and the total number of matching accounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored data is invalid.
    pub async fn list(
        &self,
        query: &AccountQuery,
        today: NaiveDate,
    ) -> Result<(Vec<Account>, i64), RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM portal.account");
        push_filters(&mut count, query, today);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(self.pool)
            .await?;

        let mut select = list_query(query, today);
        let rows = select
            .build_query_as::<AccountRow>()
            .fetch_all(self.pool)
            .await?;

        let accounts = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Account>, _>>()?;

        Ok((accounts, total))
    }
}

fn list_query(query: &AccountQuery, today: NaiveDate) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {ACCOUNT_COLUMNS} FROM portal.account"));
    push_filters(&mut builder, query, today);
    builder
        .push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(i64::from(PAGE_SIZE))
        .push(" OFFSET ")
        .push_bind(query.offset());
    builder
}

fn profile_update_query(id: UserId, update: &ProfileUpdate) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("UPDATE portal.account SET updated_at = NOW()");

    if let Some(first_name) = &update.first_name {
        builder.push(", first_name = ").push_bind(first_name.clone());
    }
    if let Some(last_name) = &update.last_name {
        builder.push(", last_name = ").push_bind(last_name.clone());
    }
    if let Some(student_id) = &update.student_id {
        builder
            .push(", student_id = ")
            .push_bind(student_id.as_ref().map(|s| s.as_str().to_owned()));
    }
    if let Some(year_group) = &update.year_group {
        builder.push(", year_group = ").push_bind(year_group.clone());
    }
    if let Some(graduation_date) = update.graduation_date {
        builder.push(", graduation_date = ").push_bind(graduation_date);
    }

    builder
        .push(" WHERE id = ")
        .push_bind(id)
        .push(format!(" RETURNING {ACCOUNT_COLUMNS}"));
    builder
}
