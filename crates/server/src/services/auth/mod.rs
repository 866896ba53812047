//! Authentication service.
//!
//! Provides self-service registration and email/password login.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use tracing::instrument;

use unitec_portal_core::{Email, InstitutionalDomains, NewAccount, RegistrationInput};

use crate::db::RepositoryError;
use crate::db::accounts::AccountRepository;
use crate::models::account::Account;

/// Authentication service.
///
/// Handles account registration and password login.
pub struct AuthService<'a> {
    accounts: AccountRepository<'a>,
    domains: &'a InstitutionalDomains,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, domains: &'a InstitutionalDomains) -> Self {
        Self {
            accounts: AccountRepository::new(pool),
            domains,
        }
    }

    /// Register a new student account.
    ///
    /// The institutional flag and initial approval status are computed here,
    /// once, from the email domain.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if any field or cross-field check fails.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip_all, fields(email = %input.email))]
    pub async fn register(&self, input: &RegistrationInput) -> Result<Account, AuthError> {
        let validated = unitec_portal_core::validate_registration(input, self.domains)?;
        let new_account = NewAccount::from_registration(&validated, self.domains);

        let password_hash = hash_password(&validated.password)?;

        let account = self
            .accounts
            .create(&new_account, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(
            user_id = %account.id,
            approval_status = %account.approval_status,
            institutional = account.is_institutional_email,
            "Account registered"
        );

        Ok(account)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (account, password_hash) = self
            .accounts
            .get_credentials(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(account)
    }
}

/// Hash a password with Argon2id and a random salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
