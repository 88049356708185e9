//! Trait abstraction for the submit backend to enable mocking in tests

use crate::state::{FieldFailure, SignUpFormData};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The backend refused specific field values
    #[error("rejected by server ({} field failure(s))", .0.len())]
    Rejected(Vec<FieldFailure>),

    /// The call itself did not complete
    #[error("transport error: {0}")]
    Transport(String),
}

/// Receives a sign-up snapshot, enabling mocking in tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmitRemote: Send + Sync {
    /// Submit the form data
    async fn submit(&self, data: &SignUpFormData) -> Result<(), SubmitError>;
}
