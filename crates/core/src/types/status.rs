//! Status and role enums for portal accounts.

use serde::{Deserialize, Serialize};

/// Account approval gate.
///
/// Seeded once at account creation from the email domain; administrators own
/// every later transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "portal.approval_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Awaiting manual review.
    #[default]
    Pending,
    /// Account is usable.
    Approved,
    /// Rejected by an administrator.
    Denied,
}

impl ApprovalStatus {
    /// Human-readable label for list views.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Denied => "Denied",
        }
    }

    /// Past-tense verb used in bulk action messages.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Pending => "reset",
            Self::Approved => "approved",
            Self::Denied => "denied",
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Denied => write!(f, "denied"),
        }
    }
}

impl std::str::FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "denied" => Ok(Self::Denied),
            _ => Err(format!("invalid approval status: {s}")),
        }
    }
}

/// Account role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "portal.account_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Self-registered learner.
    Student,
    /// Institution staff member.
    Staff,
    /// Can review and approve accounts.
    Admin,
    /// Full access including admin management.
    SuperAdmin,
}

impl Role {
    /// Whether this role may use the admin dashboard API.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Staff => "Staff",
            Self::Admin => "Admin",
            Self::SuperAdmin => "Super Admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Student => write!(f, "student"),
            Self::Staff => write!(f, "staff"),
            Self::Admin => write!(f, "admin"),
            Self::SuperAdmin => write!(f, "super_admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "staff" => Ok(Self::Staff),
            "admin" => Ok(Self::Admin),
            "super_admin" => Ok(Self::SuperAdmin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Graduation classification shown on account views.
///
/// Derived on read from the graduation date and today's date; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraduationStatus {
    /// No graduation date recorded.
    NotGraduated,
    /// Graduated and still inside the grace window.
    Graduated,
    /// Graduated and past the grace window.
    Expired,
}

impl GraduationStatus {
    /// Display label, e.g. `"Graduated (≤12m)"` for a 12 month window.
    #[must_use]
    pub fn label(self, window_months: u32) -> String {
        match self {
            Self::NotGraduated => "Not Graduated".to_owned(),
            Self::Graduated => format!("Graduated (≤{window_months}m)"),
            Self::Expired => format!("Expired (>{window_months}m)"),
        }
    }
}
