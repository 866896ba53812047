//! Unitec Portal Core - Account types and approval policy.
//!
//! This crate provides the types and rules shared by every portal component:
//! - `server` - Registration, profile, and admin dashboard API
//! - `cli` - Command-line tools for migrations and admin bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no clock reads. Callers inject "today" and the institutional domain
//! set, which keeps every rule deterministic under test.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, student IDs, and statuses
//! - [`policy`] - Email-domain, student-ID, approval, and graduation rules
//! - [`registration`] - Registration/profile validation and the account factory

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod policy;
pub mod registration;
pub mod types;

pub use policy::{
    DEFAULT_GRADUATION_WINDOW_MONTHS, EmailDomainFilter, GraduationFilter, GraduationRange,
    InstitutionalDomains,
    approval_status_for_email, extended_graduation_date, graduation_status,
    is_institutional_email, is_within_graduation_window, validate_student_id,
};
pub use registration::{
    NewAccount, ProfileUpdate, ProfileUpdateInput, RegistrationInput, ValidatedRegistration,
    ValidationErrors, validate_profile_update, validate_registration,
};
pub use types::*;
