//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use unitec_portal_core::{Email, Role, UserId};

use super::account::Account;

/// Session-stored account identity.
///
/// Minimal data stored in the session to identify the logged-in account.
/// Approval status is not cached here, and admin checks re-read the role;
/// both come from the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Account's database ID.
    pub id: UserId,
    /// Account's email address.
    pub email: Email,
    /// Account role at login time.
    pub role: Role,
}

impl From<&Account> for CurrentUser {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            email: account.email.clone(),
            role: account.role,
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in account.
    pub const CURRENT_USER: &str = "current_user";
}
