//! Business logic services.

pub mod accounts;
pub mod auth;

pub use accounts::{AccountService, BulkOutcome, ProfileError};
pub use auth::{AuthError, AuthService};
