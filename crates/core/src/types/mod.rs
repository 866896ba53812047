//! Core types for the Unitec portal.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod status;
pub mod student_id;

pub use email::{Email, EmailError};
pub use id::*;
pub use status::*;
pub use student_id::{StudentId, StudentIdError};
