//! Form domain layer
//!
//! This module provides the sign-up form's field storage, validation
//! rules and submission lifecycle, independent of any rendering.

mod controller;
mod error;
mod field;
mod submission;
mod validation;

pub use controller::{FormController, FormOptions, FormSnapshot, SubmitOutcome};
pub use error::FormResult;
pub use field::{Field, SignUpFormData};
#[cfg(test)]
pub use submission::SubmissionState;
pub use validation::{FieldFailure, ValidationFailure};
