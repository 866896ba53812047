//! Account approval and classification rules.
//!
//! Every function here is pure and total: malformed or missing input yields a
//! conservative `false` / [`ApprovalStatus::Pending`] instead of an error, and
//! nothing reads the clock. Callers pass "today" in.
//!
//! ```
//! use chrono::NaiveDate;
//! use unitec_portal_core::policy::{self, InstitutionalDomains};
//!
//! let domains = InstitutionalDomains::default();
//! assert!(policy::is_institutional_email("Student@UNITEC.AC.NZ", &domains));
//! assert!(policy::validate_student_id("123-4567"));
//!
//! let graduated = NaiveDate::from_ymd_opt(2023, 1, 1);
//! let today = NaiveDate::from_ymd_opt(2023, 12, 27).unwrap();
//! assert!(policy::is_within_graduation_window(graduated, 12, today));
//! ```

use std::collections::BTreeSet;

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::{ApprovalStatus, GraduationStatus};

/// Default graduation grace window, in months.
pub const DEFAULT_GRADUATION_WINDOW_MONTHS: u32 = 12;

/// Days counted per month when computing the graduation cutoff.
///
/// The window is deliberately approximate: 12 months is 360 days, not a
/// calendar year. Reports of graduated vs. expired accounts depend on it.
const DAYS_PER_MONTH: u64 = 30;

/// Look-back used by the admin list's graduation filter.
const GRADUATION_FILTER_DAYS: u64 = 365;

/// Domains recognized by default as the institution's address space.
const DEFAULT_DOMAINS: &[&str] = &[
    "unitec.ac.nz",
    "myunitec.ac.nz",
    "student.unitec.ac.nz",
    "staff.unitec.ac.nz",
    "faculty.unitec.ac.nz",
];

/// The set of email domains treated as institutional.
///
/// Entries are stored trimmed and lowercased; lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstitutionalDomains {
    domains: BTreeSet<String>,
}

impl InstitutionalDomains {
    /// Build a domain set from a comma-separated list such as
    /// `"unitec.ac.nz, myunitec.ac.nz"`. Blank entries are ignored.
    #[must_use]
    pub fn parse_list(list: &str) -> Self {
        list.split(',').collect()
    }

    /// Whether `domain` is in the set, ignoring ASCII case.
    #[must_use]
    pub fn contains(&self, domain: &str) -> bool {
        self.domains.contains(&domain.to_ascii_lowercase())
    }

    /// Whether the set has no entries (every email is then non-institutional).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Iterate over the normalized domains in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(String::as_str)
    }
}

impl Default for InstitutionalDomains {
    fn default() -> Self {
        DEFAULT_DOMAINS.iter().copied().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for InstitutionalDomains {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let domains = iter
            .into_iter()
            .map(|d| d.as_ref().trim().to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self { domains }
    }
}

/// Whether `email` belongs to an institutional domain.
///
/// The domain is everything after the first `@`. Input without an `@`
/// (including the empty string) is never institutional.
#[must_use]
pub fn is_institutional_email(email: &str, domains: &InstitutionalDomains) -> bool {
    email
        .split_once('@')
        .is_some_and(|(_, domain)| domains.contains(domain))
}

/// Whether `id` is a well-formed student ID.
///
/// Characters other than ASCII letters and digits are stripped first; what
/// remains must be exactly seven ASCII digits.
#[must_use]
pub fn validate_student_id(id: &str) -> bool {
    let cleaned = strip_non_alphanumeric(id);
    cleaned.len() == crate::StudentId::LENGTH && cleaned.bytes().all(|b| b.is_ascii_digit())
}

pub(crate) fn strip_non_alphanumeric(s: &str) -> String {
    s.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Default approval status for a new account with this email.
///
/// Only the account-creation pathway may use this; it must never overwrite a
/// status an administrator has already decided.
#[must_use]
pub fn approval_status_for_email(email: &str, domains: &InstitutionalDomains) -> ApprovalStatus {
    if is_institutional_email(email, domains) {
        ApprovalStatus::Approved
    } else {
        ApprovalStatus::Pending
    }
}

/// Whether `today` is still inside the grace window after `graduation_date`.
///
/// The cutoff is `graduation_date + window_months * 30 days`, inclusive.
/// A missing date is never within the window.
#[must_use]
pub fn is_within_graduation_window(
    graduation_date: Option<NaiveDate>,
    window_months: u32,
    today: NaiveDate,
) -> bool {
    let Some(graduated) = graduation_date else {
        return false;
    };

    let window = Days::new(u64::from(window_months) * DAYS_PER_MONTH);
    // A cutoff past the end of the calendar is never reached.
    graduated
        .checked_add_days(window)
        .is_none_or(|cutoff| today <= cutoff)
}

/// Classify an account's graduation state for display.
#[must_use]
pub fn graduation_status(
    graduation_date: Option<NaiveDate>,
    window_months: u32,
    today: NaiveDate,
) -> GraduationStatus {
    match graduation_date {
        None => GraduationStatus::NotGraduated,
        Some(_) if is_within_graduation_window(graduation_date, window_months, today) => {
            GraduationStatus::Graduated
        }
        Some(_) => GraduationStatus::Expired,
    }
}

/// New graduation date set by the bulk "extend" admin action.
///
/// Exactly one calendar year after `today`; the previous graduation date is
/// not consulted. 29 February maps to 28 February.
#[must_use]
pub fn extended_graduation_date(today: NaiveDate) -> NaiveDate {
    today
        .checked_add_months(Months::new(12))
        .unwrap_or(NaiveDate::MAX)
}

/// Graduation filter offered by the admin account list.
///
/// Uses a 365-day look-back from today, independent of the display window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraduationFilter {
    /// Graduated within the last 365 days (and not in the future).
    Graduated,
    /// Graduated more than 365 days ago.
    Expired,
    /// No graduation date recorded.
    NotGraduated,
}

impl GraduationFilter {
    /// Graduation dates this filter selects for `today`.
    #[must_use]
    pub fn range(self, today: NaiveDate) -> GraduationRange {
        let threshold = today
            .checked_sub_days(Days::new(GRADUATION_FILTER_DAYS))
            .unwrap_or(NaiveDate::MIN);

        match self {
            Self::Graduated => GraduationRange::Between {
                from: threshold,
                to: today,
            },
            Self::Expired => GraduationRange::Before(threshold),
            Self::NotGraduated => GraduationRange::Unset,
        }
    }
}

/// Graduation-date selection produced by [`GraduationFilter::range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraduationRange {
    /// No graduation date recorded.
    Unset,
    /// Graduation date in `from..=to`.
    Between { from: NaiveDate, to: NaiveDate },
    /// Graduation date strictly before the given day.
    Before(NaiveDate),
}

/// Email-domain filter offered by the admin account list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailDomainFilter {
    /// Accounts registered with an institutional email.
    Institutional,
    /// Everyone else.
    NonInstitutional,
}

impl EmailDomainFilter {
    /// Stored flag value this filter selects.
    #[must_use]
    pub const fn institutional_flag(self) -> bool {
        matches!(self, Self::Institutional)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_strings_without_at_are_never_institutional() {
        let domains = InstitutionalDomains::default();
        for s in ["", "unitec.ac.nz", "student.unitec.ac.nz", "john", "   "] {
            assert!(!is_institutional_email(s, &domains), "{s:?}");
        }
    }

    #[test]
    fn test_every_default_domain_is_institutional_in_any_case() {
        let domains = InstitutionalDomains::default();
        for domain in DEFAULT_DOMAINS {
            assert!(is_institutional_email(&format!("jane@{domain}"), &domains));
            assert!(is_institutional_email(
                &format!("JANE@{}", domain.to_uppercase()),
                &domains
            ));
        }
        assert!(is_institutional_email("Student@UNITEC.AC.NZ", &domains));
    }

    #[test]
    fn test_other_domains_are_not_institutional() {
        let domains = InstitutionalDomains::default();
        assert!(!is_institutional_email("john@gmail.com", &domains));
        assert!(!is_institutional_email("john@unitec.ac.nz.evil.com", &domains));
        assert!(!is_institutional_email("john@notunitec.ac.nz", &domains));
        assert!(!is_institutional_email("john@", &domains));
    }

    #[test]
    fn test_domain_starts_after_first_at() {
        let domains = InstitutionalDomains::default();
        assert!(!is_institutional_email("a@b@unitec.ac.nz", &domains));
        assert!(!is_institutional_email("a@unitec.ac.nz@gmail.com", &domains));
    }

    #[test]
    fn test_injected_domain_set() {
        let domains = InstitutionalDomains::parse_list(" Example.EDU, ,staff.example.edu ");
        assert_eq!(
            domains.iter().collect::<Vec<_>>(),
            vec!["example.edu", "staff.example.edu"]
        );
        assert!(is_institutional_email("a@example.edu", &domains));
        assert!(!is_institutional_email("a@unitec.ac.nz", &domains));

        let empty = InstitutionalDomains::parse_list("");
        assert!(empty.is_empty());
        assert!(!is_institutional_email("a@unitec.ac.nz", &empty));
    }

    #[test]
    fn test_validate_student_id() {
        assert!(validate_student_id("1234567"));
        assert!(validate_student_id("123-4567"));
        assert!(validate_student_id(" 12 34 567 "));
        assert!(!validate_student_id("12345678"));
        assert!(!validate_student_id("123456"));
        assert!(!validate_student_id(""));
        assert!(!validate_student_id("---"));
        assert!(!validate_student_id("A234567"));
        // Non-ASCII digits are stripped, not counted.
        assert!(!validate_student_id("123456٧"));
    }

    #[test]
    fn test_approval_status_tracks_domain_check() {
        let domains = InstitutionalDomains::default();
        for email in [
            "john@unitec.ac.nz",
            "john@gmail.com",
            "",
            "no-at",
            "x@STAFF.unitec.ac.nz",
        ] {
            let expected = if is_institutional_email(email, &domains) {
                ApprovalStatus::Approved
            } else {
                ApprovalStatus::Pending
            };
            assert_eq!(approval_status_for_email(email, &domains), expected);
            // No hidden state between calls.
            assert_eq!(approval_status_for_email(email, &domains), expected);
        }
    }

    #[test]
    fn test_missing_graduation_date_is_outside_window() {
        assert!(!is_within_graduation_window(None, 12, date(2000, 1, 1)));
        assert!(!is_within_graduation_window(None, 0, date(2030, 6, 1)));
    }

    #[test]
    fn test_graduation_window_uses_thirty_day_months() {
        let graduated = Some(date(2023, 1, 1));
        assert!(is_within_graduation_window(graduated, 12, date(2023, 12, 27)));
        assert!(!is_within_graduation_window(graduated, 12, date(2023, 12, 28)));
        // A real calendar year would still include 1 January 2024.
        assert!(!is_within_graduation_window(graduated, 12, date(2024, 1, 1)));
        // Dates before graduation are inside the window.
        assert!(is_within_graduation_window(graduated, 12, date(2022, 6, 1)));
    }

    #[test]
    fn test_zero_month_window_covers_graduation_day_only() {
        let graduated = Some(date(2024, 3, 10));
        assert!(is_within_graduation_window(graduated, 0, date(2024, 3, 10)));
        assert!(!is_within_graduation_window(graduated, 0, date(2024, 3, 11)));
    }

    #[test]
    fn test_window_past_end_of_calendar() {
        assert!(is_within_graduation_window(
            Some(NaiveDate::MAX),
            12,
            NaiveDate::MAX
        ));
    }

    #[test]
    fn test_graduation_status() {
        let today = date(2024, 6, 1);
        assert_eq!(
            graduation_status(None, 12, today),
            GraduationStatus::NotGraduated
        );
        assert_eq!(
            graduation_status(Some(date(2024, 1, 1)), 12, today),
            GraduationStatus::Graduated
        );
        assert_eq!(
            graduation_status(Some(date(2023, 1, 1)), 12, today),
            GraduationStatus::Expired
        );
    }

    #[test]
    fn test_extended_graduation_date_is_one_year_from_today() {
        assert_eq!(extended_graduation_date(date(2023, 6, 15)), date(2024, 6, 15));
        assert_eq!(extended_graduation_date(date(2024, 2, 29)), date(2025, 2, 28));
        assert_eq!(extended_graduation_date(date(2023, 12, 31)), date(2024, 12, 31));
    }

    #[test]
    fn test_graduation_filter_ranges() {
        let today = date(2024, 6, 1);

        assert_eq!(
            GraduationFilter::Graduated.range(today),
            GraduationRange::Between {
                from: date(2023, 6, 2),
                to: today,
            }
        );
        assert_eq!(
            GraduationFilter::Expired.range(today),
            GraduationRange::Before(date(2023, 6, 2))
        );
        assert_eq!(
            GraduationFilter::NotGraduated.range(today),
            GraduationRange::Unset
        );
    }

    #[test]
    fn test_filters_deserialize_from_query_values() {
        let f: GraduationFilter = serde_json::from_str("\"not_graduated\"").unwrap();
        assert_eq!(f, GraduationFilter::NotGraduated);

        let d: EmailDomainFilter = serde_json::from_str("\"non_institutional\"").unwrap();
        assert!(!d.institutional_flag());
        assert!(EmailDomainFilter::Institutional.institutional_flag());
    }
}
