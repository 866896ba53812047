//! Authentication error types.

use thiserror::Error;

use unitec_portal_core::ValidationErrors;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Registration input failed field or cross-field validation.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Invalid credentials (wrong password or account not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Account already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
