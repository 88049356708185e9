//! Simulated sign-up backend
//!
//! Stands in for a network service: waits a fixed delay, then accepts the
//! sign-up unless the username is on its "taken" list.

use super::traits::{SubmitError, SubmitRemote};
use crate::config::SignupConfig;
use crate::state::{Field, FieldFailure, SignUpFormData, ValidationFailure};
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;

/// Message attached to a rejected username
pub const TAKEN_MESSAGE: &str = "already taken";

#[derive(Debug, Clone)]
pub struct SimulatedRemote {
    delay: Duration,
    /// Lowercased
    taken_usernames: HashSet<String>,
}

impl SimulatedRemote {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            taken_usernames: HashSet::new(),
        }
    }

    pub fn from_config(config: &SignupConfig) -> Self {
        Self::new(config.submit_delay()).with_taken_usernames(config.taken_usernames())
    }

    pub fn with_taken_usernames<I, S>(mut self, usernames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.taken_usernames
            .extend(usernames.into_iter().map(|u| u.as_ref().to_lowercase()));
        self
    }

    fn is_taken(&self, username: &str) -> bool {
        self.taken_usernames.contains(&username.to_lowercase())
    }
}

impl Default for SimulatedRemote {
    fn default() -> Self {
        Self::new(Duration::from_millis(SignupConfig::DEFAULT_SUBMIT_DELAY_MS))
    }
}

#[async_trait]
impl SubmitRemote for SimulatedRemote {
    async fn submit(&self, data: &SignUpFormData) -> Result<(), SubmitError> {
        tracing::debug!(username = %data.username, delay_ms = self.delay.as_millis() as u64, "simulated submit");
        tokio::time::sleep(self.delay).await;

        if self.is_taken(&data.username) {
            return Err(SubmitError::Rejected(vec![FieldFailure::new(
                Field::Username,
                ValidationFailure::server(TAKEN_MESSAGE),
            )]));
        }
        Ok(())
    }
}
