//! Registration and profile validation, and the one-time account factory.
//!
//! Validation collects every field problem into [`ValidationErrors`] so the
//! API can report them together. Derived account fields
//! (`is_institutional_email`, `approval_status`) are computed in exactly one
//! place, [`NewAccount`], which only the creation pathway constructs.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::policy::{self, InstitutionalDomains};
use crate::types::{ApprovalStatus, Email, EmailError, Role, StudentId};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum length of first/last names.
pub const MAX_NAME_LENGTH: usize = 150;

/// Maximum length of a year group code.
pub const MAX_YEAR_GROUP_LENGTH: usize = 10;

const REQUIRED: &str = "This field is required.";
const INVALID_STUDENT_ID: &str = "Invalid Unitec student ID format. Please check your student ID.";
const STUDENT_ID_REQUIRES_INSTITUTIONAL_EMAIL: &str =
    "Unitec student ID can only be provided with Unitec email addresses.";

/// Field-level validation failures, keyed by field name.
///
/// Serializes as `{"field": ["message", ...]}`. Errors that concern more than
/// one field live under [`ValidationErrors::NON_FIELD`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(transparent)]
#[error("validation failed for: {}", .errors.keys().cloned().collect::<Vec<_>>().join(", "))]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Key for errors that are not tied to a single field.
    pub const NON_FIELD: &'static str = "non_field_errors";

    /// Create an empty error set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an error set holding a single message.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record a message against `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    /// Whether no errors were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Messages recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.errors.get(field).map_or(&[], Vec::as_slice)
    }

    /// Names of the fields that failed, in sorted order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// `Ok(value)` if no errors were recorded, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one error was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Self-service registration request body.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationInput {
    pub email: String,
    pub password: String,
    /// Password confirmation; checked only when supplied.
    pub re_password: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(alias = "unitec_id")]
    pub student_id: Option<String>,
    pub year_group: Option<String>,
    pub graduation_date: Option<NaiveDate>,
}

impl fmt::Debug for RegistrationInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationInput")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("student_id", &self.student_id)
            .field("year_group", &self.year_group)
            .field("graduation_date", &self.graduation_date)
            .finish_non_exhaustive()
    }
}

/// A registration request that passed every check.
#[derive(Clone)]
pub struct ValidatedRegistration {
    pub email: Email,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub student_id: Option<StudentId>,
    pub year_group: Option<String>,
    pub graduation_date: Option<NaiveDate>,
}

impl fmt::Debug for ValidatedRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedRegistration")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("student_id", &self.student_id)
            .finish_non_exhaustive()
    }
}

/// Validate a registration request.
///
/// Field checks run first; the cross-field rule (a student ID requires an
/// institutional email) runs only once every field is individually valid.
///
/// # Errors
///
/// Returns every field and cross-field failure found.
pub fn validate_registration(
    input: &RegistrationInput,
    domains: &InstitutionalDomains,
) -> Result<ValidatedRegistration, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let email = match Email::parse(&input.email) {
        Ok(email) => Some(email),
        Err(EmailError::Empty) => {
            errors.add("email", "Email is required.");
            None
        }
        Err(_) => {
            errors.add("email", "Enter a valid email address.");
            None
        }
    };

    if input.password.is_empty() {
        errors.add("password", REQUIRED);
    } else if input.password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(
            "password",
            format!("Password must be at least {MIN_PASSWORD_LENGTH} characters."),
        );
    }
    if input
        .re_password
        .as_deref()
        .is_some_and(|confirm| confirm != input.password)
    {
        errors.add("re_password", "The two password fields didn't match.");
    }

    let first_name = required_name(&mut errors, "first_name", &input.first_name);
    let last_name = required_name(&mut errors, "last_name", &input.last_name);
    let student_id = optional_student_id(&mut errors, input.student_id.as_deref());
    let year_group = optional_year_group(&mut errors, input.year_group.as_deref());

    if !errors.is_empty() {
        return Err(errors);
    }

    let Some(email) = email else {
        return Err(ValidationErrors::single("email", "Email is required."));
    };

    if student_id.is_some() && !policy::is_institutional_email(email.as_str(), domains) {
        return Err(ValidationErrors::single(
            ValidationErrors::NON_FIELD,
            STUDENT_ID_REQUIRES_INSTITUTIONAL_EMAIL,
        ));
    }

    Ok(ValidatedRegistration {
        email,
        password: input.password.clone(),
        first_name,
        last_name,
        student_id,
        year_group,
        graduation_date: input.graduation_date,
    })
}

fn required_name(errors: &mut ValidationErrors, field: &str, value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    } else if value.chars().count() > MAX_NAME_LENGTH {
        errors.add(
            field,
            format!("Ensure this field has no more than {MAX_NAME_LENGTH} characters."),
        );
    }
    value.to_owned()
}

/// Blank input counts as "not provided".
fn optional_student_id(errors: &mut ValidationErrors, value: Option<&str>) -> Option<StudentId> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    StudentId::parse(value)
        .inspect_err(|_| errors.add("student_id", INVALID_STUDENT_ID))
        .ok()
}

fn optional_year_group(errors: &mut ValidationErrors, value: Option<&str>) -> Option<String> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    if value.chars().count() > MAX_YEAR_GROUP_LENGTH {
        errors.add(
            "year_group",
            format!("Ensure this field has no more than {MAX_YEAR_GROUP_LENGTH} characters."),
        );
    }
    Some(value.to_owned())
}

// =============================================================================
// Account factory
// =============================================================================

/// An account ready to insert, with derived fields already computed.
///
/// Fields are private so the derived flags cannot drift from the email: the
/// only constructors are [`NewAccount::from_registration`] and
/// [`NewAccount::for_operator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    email: Email,
    first_name: String,
    last_name: String,
    student_id: Option<StudentId>,
    year_group: Option<String>,
    graduation_date: Option<NaiveDate>,
    is_institutional_email: bool,
    approval_status: ApprovalStatus,
    role: Role,
}

impl NewAccount {
    /// Build a self-registered student account.
    ///
    /// Computes the institutional flag and the default approval status from
    /// the email. This is the only place registration seeds them.
    #[must_use]
    pub fn from_registration(
        registration: &ValidatedRegistration,
        domains: &InstitutionalDomains,
    ) -> Self {
        let email = registration.email.as_str();
        Self {
            email: registration.email.clone(),
            first_name: registration.first_name.clone(),
            last_name: registration.last_name.clone(),
            student_id: registration.student_id.clone(),
            year_group: registration.year_group.clone(),
            graduation_date: registration.graduation_date,
            is_institutional_email: policy::is_institutional_email(email, domains),
            approval_status: policy::approval_status_for_email(email, domains),
            role: Role::Student,
        }
    }

    /// Build an account created by an operator (CLI bootstrap).
    ///
    /// The institutional flag still follows the email; the account is
    /// approved because the operator is the approving administrator.
    #[must_use]
    pub fn for_operator(
        email: Email,
        first_name: &str,
        last_name: &str,
        role: Role,
        domains: &InstitutionalDomains,
    ) -> Self {
        let is_institutional_email = policy::is_institutional_email(email.as_str(), domains);
        Self {
            email,
            first_name: first_name.trim().to_owned(),
            last_name: last_name.trim().to_owned(),
            student_id: None,
            year_group: None,
            graduation_date: None,
            is_institutional_email,
            approval_status: ApprovalStatus::Approved,
            role,
        }
    }

    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    #[must_use]
    pub const fn student_id(&self) -> Option<&StudentId> {
        self.student_id.as_ref()
    }

    #[must_use]
    pub fn year_group(&self) -> Option<&str> {
        self.year_group.as_deref()
    }

    #[must_use]
    pub const fn graduation_date(&self) -> Option<NaiveDate> {
        self.graduation_date
    }

    #[must_use]
    pub const fn is_institutional_email(&self) -> bool {
        self.is_institutional_email
    }

    #[must_use]
    pub const fn approval_status(&self) -> ApprovalStatus {
        self.approval_status
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }
}

// =============================================================================
// Profile update
// =============================================================================

/// Profile update request body. Absent fields are left unchanged; an empty
/// `student_id` or `year_group` clears the stored value, and so does a `null`
/// `graduation_date`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileUpdateInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(alias = "unitec_id")]
    pub student_id: Option<String>,
    pub year_group: Option<String>,
    #[serde(deserialize_with = "present")]
    pub graduation_date: Option<Option<NaiveDate>>,
}

/// Marks a field as present, keeping an explicit `null` as `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A validated profile change.
///
/// Carries no email, institutional flag, or approval status: profile updates
/// never touch derived fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// `Some(None)` clears the student ID.
    pub student_id: Option<Option<StudentId>>,
    /// `Some(None)` clears the year group.
    pub year_group: Option<Option<String>>,
    /// `Some(None)` clears the graduation date.
    pub graduation_date: Option<Option<NaiveDate>>,
}

impl ProfileUpdate {
    /// Whether the update changes nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Validate a profile update for an account whose stored institutional flag is
/// `is_institutional_email`.
///
/// # Errors
///
/// Returns field errors for blank names, a malformed student ID, or an
/// over-long year group, and a cross-field error when a student ID is set on a
/// non-institutional account.
pub fn validate_profile_update(
    input: &ProfileUpdateInput,
    is_institutional_email: bool,
) -> Result<ProfileUpdate, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let first_name = input
        .first_name
        .as_deref()
        .map(|v| required_name(&mut errors, "first_name", v));
    let last_name = input
        .last_name
        .as_deref()
        .map(|v| required_name(&mut errors, "last_name", v));
    let student_id = input
        .student_id
        .as_deref()
        .map(|v| optional_student_id(&mut errors, Some(v)));
    let year_group = input
        .year_group
        .as_deref()
        .map(|v| optional_year_group(&mut errors, Some(v)));

    if errors.is_empty() && matches!(student_id, Some(Some(_))) && !is_institutional_email {
        errors.add(
            ValidationErrors::NON_FIELD,
            STUDENT_ID_REQUIRES_INSTITUTIONAL_EMAIL,
        );
    }

    errors.into_result(ProfileUpdate {
        first_name,
        last_name,
        student_id,
        year_group,
        graduation_date: input.graduation_date,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(email: &str, student_id: Option<&str>) -> RegistrationInput {
        RegistrationInput {
            email: email.to_owned(),
            password: "correct-horse".to_owned(),
            re_password: None,
            first_name: "John".to_owned(),
            last_name: "Smith".to_owned(),
            student_id: student_id.map(str::to_owned),
            year_group: Some("Y3".to_owned()),
            graduation_date: NaiveDate::from_ymd_opt(2025, 11, 30),
        }
    }

    #[test]
    fn test_student_id_with_non_institutional_email_is_rejected() {
        let domains = InstitutionalDomains::default();
        let err = validate_registration(&input("john@gmail.com", Some("1234567")), &domains)
            .unwrap_err();

        assert_eq!(
            err.get(ValidationErrors::NON_FIELD),
            [STUDENT_ID_REQUIRES_INSTITUTIONAL_EMAIL]
        );
        assert!(err.get("student_id").is_empty());
    }

    #[test]
    fn test_student_id_with_institutional_email_is_approved() {
        let domains = InstitutionalDomains::default();
        let validated =
            validate_registration(&input("john@unitec.ac.nz", Some("1234567")), &domains)
                .unwrap();
        let account = NewAccount::from_registration(&validated, &domains);

        assert_eq!(account.approval_status(), ApprovalStatus::Approved);
        assert!(account.is_institutional_email());
        assert_eq!(account.role(), Role::Student);
        assert_eq!(account.student_id().unwrap().as_str(), "1234567");
        assert_eq!(account.year_group(), Some("Y3"));
    }

    #[test]
    fn test_non_institutional_registration_is_pending() {
        let domains = InstitutionalDomains::default();
        let validated = validate_registration(&input("john@gmail.com", None), &domains).unwrap();
        let account = NewAccount::from_registration(&validated, &domains);

        assert_eq!(account.approval_status(), ApprovalStatus::Pending);
        assert!(!account.is_institutional_email());
        assert_eq!(account.student_id(), None);
    }

    #[test]
    fn test_blank_student_id_counts_as_absent() {
        let domains = InstitutionalDomains::default();
        let validated =
            validate_registration(&input("john@gmail.com", Some("   ")), &domains).unwrap();
        assert_eq!(validated.student_id, None);
    }

    #[test]
    fn test_field_errors_are_collected_together() {
        let domains = InstitutionalDomains::default();
        let bad = RegistrationInput {
            email: "not-an-email".to_owned(),
            password: "short".to_owned(),
            re_password: Some("different".to_owned()),
            first_name: "  ".to_owned(),
            last_name: "Smith".to_owned(),
            student_id: Some("12-34".to_owned()),
            year_group: Some("much-too-long-year".to_owned()),
            graduation_date: None,
        };

        let err = validate_registration(&bad, &domains).unwrap_err();
        assert_eq!(
            err.fields().collect::<Vec<_>>(),
            vec![
                "email",
                "first_name",
                "password",
                "re_password",
                "student_id",
                "year_group"
            ]
        );
        assert_eq!(err.get("student_id"), [INVALID_STUDENT_ID]);
        // Cross-field rule waits until fields are valid.
        assert!(err.get(ValidationErrors::NON_FIELD).is_empty());
    }

    #[test]
    fn test_malformed_emails_are_field_errors() {
        let domains = InstitutionalDomains::default();
        for email in [
            "john@@gmail.com",
            "john doe@gmail.com",
            "john@gmail com",
            "j<o>hn@x",
        ] {
            let err = validate_registration(&input(email, None), &domains).unwrap_err();
            assert_eq!(err.get("email"), ["Enter a valid email address."], "{email}");
        }
    }

    #[test]
    fn test_missing_email_message() {
        let domains = InstitutionalDomains::default();
        let err = validate_registration(&input("", None), &domains).unwrap_err();
        assert_eq!(err.get("email"), ["Email is required."]);
    }

    #[test]
    fn test_validation_errors_serialize_as_field_map() {
        let err = ValidationErrors::single("student_id", "bad");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({ "student_id": ["bad"] }));
        assert_eq!(err.to_string(), "validation failed for: student_id");
    }

    #[test]
    fn test_registration_input_accepts_legacy_field_name() {
        let parsed: RegistrationInput = serde_json::from_str(
            r#"{"email":"a@unitec.ac.nz","password":"x","unitec_id":"1234567"}"#,
        )
        .unwrap();
        assert_eq!(parsed.student_id.as_deref(), Some("1234567"));
        assert!(!format!("{parsed:?}").contains("\"x\""));
    }

    #[test]
    fn test_operator_account_is_approved_with_derived_flag() {
        let domains = InstitutionalDomains::default();
        let email = Email::parse("ops@gmail.com").unwrap();
        let account = NewAccount::for_operator(email, " Ops ", "Team", Role::Admin, &domains);

        assert!(!account.is_institutional_email());
        assert_eq!(account.approval_status(), ApprovalStatus::Approved);
        assert_eq!(account.role(), Role::Admin);
        assert_eq!(account.first_name(), "Ops");
    }

    #[test]
    fn test_profile_update_validation() {
        let update = ProfileUpdateInput {
            student_id: Some("765-4321".to_owned()),
            year_group: Some(String::new()),
            ..ProfileUpdateInput::default()
        };

        let ok = validate_profile_update(&update, true).unwrap();
        assert_eq!(
            ok.student_id,
            Some(Some(StudentId::parse("7654321").unwrap()))
        );
        assert_eq!(ok.year_group, Some(None));
        assert_eq!(ok.first_name, None);

        let err = validate_profile_update(&update, false).unwrap_err();
        assert_eq!(
            err.get(ValidationErrors::NON_FIELD),
            [STUDENT_ID_REQUIRES_INSTITUTIONAL_EMAIL]
        );

        let bad = ProfileUpdateInput {
            student_id: Some("abc".to_owned()),
            first_name: Some(String::new()),
            ..ProfileUpdateInput::default()
        };
        let err = validate_profile_update(&bad, true).unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["first_name", "student_id"]);
    }

    #[test]
    fn test_clearing_student_id_is_allowed_anywhere() {
        let update = ProfileUpdateInput {
            student_id: Some(String::new()),
            ..ProfileUpdateInput::default()
        };
        let ok = validate_profile_update(&update, false).unwrap();
        assert_eq!(ok.student_id, Some(None));
        assert!(!ok.is_noop());
        assert!(ProfileUpdate::default().is_noop());
    }

    #[test]
    fn test_profile_graduation_date_null_clears_and_absent_keeps() {
        let cleared: ProfileUpdateInput =
            serde_json::from_str(r#"{"graduation_date": null}"#).unwrap();
        assert_eq!(cleared.graduation_date, Some(None));
        let ok = validate_profile_update(&cleared, false).unwrap();
        assert_eq!(ok.graduation_date, Some(None));
        assert!(!ok.is_noop());

        let set: ProfileUpdateInput =
            serde_json::from_str(r#"{"graduation_date": "2025-11-30"}"#).unwrap();
        assert_eq!(
            set.graduation_date,
            Some(NaiveDate::from_ymd_opt(2025, 11, 30))
        );

        let absent: ProfileUpdateInput = serde_json::from_str(r#"{"first_name": "Jane"}"#).unwrap();
        assert_eq!(absent.graduation_date, None);
        assert_eq!(
            validate_profile_update(&absent, false).unwrap().graduation_date,
            None
        );
    }
}
