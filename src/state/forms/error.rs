//! Form error types

use super::submission::SubmissionState;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("form state lock poisoned while {0}")]
    StatePoisoned(&'static str),

    #[error("invalid submission state transition: {from:?} -> {to:?}")]
    InvalidStateTransition {
        from: SubmissionState,
        to: SubmissionState,
    },
}

pub type FormResult<T> = Result<T, FormError>;
