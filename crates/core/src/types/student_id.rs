//! Institution-issued student identifier.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::policy;

/// Errors that can occur when parsing a [`StudentId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StudentIdError {
    /// After stripping separators the value is not exactly seven digits.
    #[error("student id must be 7 digits")]
    InvalidFormat,
}

/// A normalized student ID: exactly seven ASCII digits.
///
/// Separators and whitespace in the input are dropped, so `"123-4567"` and
/// `"123 4567"` both normalize to `"1234567"`.
///
/// ```
/// use unitec_portal_core::StudentId;
///
/// assert_eq!(StudentId::parse("123-4567").unwrap().as_str(), "1234567");
/// assert!(StudentId::parse("12345678").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StudentId(String);

impl StudentId {
    /// Number of digits in a student ID.
    pub const LENGTH: usize = 7;

    /// Parse and normalize a student ID.
    ///
    /// # Errors
    ///
    /// Returns [`StudentIdError::InvalidFormat`] unless the alphanumeric
    /// characters of `s` are exactly seven ASCII digits.
    pub fn parse(s: &str) -> Result<Self, StudentIdError> {
        if !policy::validate_student_id(s) {
            return Err(StudentIdError::InvalidFormat);
        }

        Ok(Self(policy::strip_non_alphanumeric(s)))
    }

    /// Returns the normalized digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for StudentId {
    type Err = StudentIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for StudentId {
    type Error = StudentIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StudentId> for String {
    fn from(id: StudentId) -> Self {
        id.0
    }
}
