//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! portal-cli admin create -e ops@unitec.ac.nz -f Ops -l Team -r super_admin -p 'long passphrase'
//! ```
//!
//! # Environment Variables
//!
//! - `PORTAL_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `INSTITUTIONAL_DOMAINS` - Comma-separated institutional domains (default: Unitec set)

use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

use unitec_portal_core::registration::MIN_PASSWORD_LENGTH;
use unitec_portal_core::{Email, InstitutionalDomains, NewAccount, Role, UserId};
use unitec_portal_server::db::{AccountRepository, RepositoryError};
use unitec_portal_server::services::auth::{AuthError, hash_password};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository error.
    #[error("{0}")]
    Repository(RepositoryError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: student, staff, admin, super_admin")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password too short.
    #[error("Password must be at least {} characters", MIN_PASSWORD_LENGTH)]
    WeakPassword,

    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    Hash(#[from] AuthError),

    /// Account already exists.
    #[error("Account already exists with email: {0}")]
    UserExists(String),
}

/// Arguments for `admin create`.
pub struct CreateArgs<'a> {
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub role: &'a str,
    pub password: &'a str,
}

/// Create an approved account with the requested role.
///
/// The institutional flag is derived from the email the same way
/// registration derives it.
///
/// # Returns
///
/// The ID of the created account.
///
/// # Errors
///
/// Returns `AdminError` for invalid input, a duplicate email, or database failures.
pub async fn create_user(args: &CreateArgs<'_>) -> Result<UserId, AdminError> {
    dotenvy::dotenv().ok();

    let (account, password_hash) = prepare_account(args, &domains_from_env())?;

    let database_url =
        super::database_url().ok_or(AdminError::MissingEnvVar("PORTAL_DATABASE_URL"))?;

    tracing::info!("Connecting to portal database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Creating account: {} ({})", account.email(), account.role());

    let created = AccountRepository::new(&pool)
        .create(&account, &password_hash)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AdminError::UserExists(args.email.to_owned()),
            other => AdminError::Repository(other),
        })?;

    tracing::info!(
        "Account created successfully! ID: {}, Email: {}, Role: {}, Institutional: {}",
        created.id,
        created.email,
        created.role,
        created.is_institutional_email
    );

    Ok(created.id)
}

fn domains_from_env() -> InstitutionalDomains {
    std::env::var("INSTITUTIONAL_DOMAINS")
        .ok()
        .map(|list| InstitutionalDomains::parse_list(&list))
        .filter(|domains| !domains.is_empty())
        .unwrap_or_default()
}

/// Validate arguments and build the account plus its password hash.
fn prepare_account(
    args: &CreateArgs<'_>,
    domains: &InstitutionalDomains,
) -> Result<(NewAccount, String), AdminError> {
    let role: Role = args
        .role
        .parse()
        .map_err(|_| AdminError::InvalidRole(args.role.to_owned()))?;

    let email = Email::parse(args.email)
        .map_err(|e| AdminError::InvalidEmail(format!("{}: {e}", args.email)))?;

    if args.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AdminError::WeakPassword);
    }
    let password_hash = hash_password(args.password)?;

    let account = NewAccount::for_operator(email, args.first_name, args.last_name, role, domains);
    Ok((account, password_hash))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use unitec_portal_core::ApprovalStatus;

    use super::*;

    fn args<'a>(email: &'a str, role: &'a str, password: &'a str) -> CreateArgs<'a> {
        CreateArgs {
            email,
            first_name: "Ops",
            last_name: "Team",
            role,
            password,
        }
    }

    #[test]
    fn test_prepare_account_derives_flag_and_approves() {
        let domains = InstitutionalDomains::default();
        let input = args("ops@staff.unitec.ac.nz", "super_admin", "long passphrase");
        let (account, hash) = prepare_account(&input, &domains).unwrap();

        assert!(account.is_institutional_email());
        assert_eq!(account.approval_status(), ApprovalStatus::Approved);
        assert_eq!(account.role(), Role::SuperAdmin);
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn test_prepare_account_rejects_bad_input() {
        let domains = InstitutionalDomains::default();
        assert!(matches!(
            prepare_account(&args("ops@unitec.ac.nz", "owner", "long passphrase"), &domains),
            Err(AdminError::InvalidRole(_))
        ));
        assert!(matches!(
            prepare_account(&args("not-an-email", "admin", "long passphrase"), &domains),
            Err(AdminError::InvalidEmail(_))
        ));
        assert!(matches!(
            prepare_account(&args("ops@unitec.ac.nz", "admin", "short"), &domains),
            Err(AdminError::WeakPassword)
        ));
    }
}
