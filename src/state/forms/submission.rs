//! Submission lifecycle state machine
//!
//! Tracks where the form is in the submit flow, guards against a second
//! submission while one is in flight, and owns the success banner along
//! with its pending auto-hide task.

use super::error::{FormError, FormResult};
use super::field::SignUpFormData;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    Submitting,
    /// Banner is up, falls back to `Idle` when it hides
    Succeeded,
}

impl SubmissionState {
    /// Whether a submission is currently running
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Validating | Self::Submitting)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Submitting => "submitting",
            Self::Succeeded => "succeeded",
        }
    }
}

/// A successfully submitted snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub id: Uuid,
    pub data: SignUpFormData,
    pub submitted_at: DateTime<Utc>,
}

impl Submission {
    pub fn new(data: SignUpFormData) -> Self {
        Self {
            id: Uuid::new_v4(),
            data,
            submitted_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default)]
struct BannerState {
    visible: bool,
    shown_at: Option<Instant>,
    /// Bumped on every show so a late hide can tell it is stale
    generation: u64,
    hide_task: Option<JoinHandle<()>>,
}

impl BannerState {
    fn show(&mut self) -> u64 {
        self.cancel_hide();
        self.generation += 1;
        self.visible = true;
        self.shown_at = Some(Instant::now());
        self.generation
    }

    fn hide(&mut self) {
        self.visible = false;
        self.shown_at = None;
    }

    fn cancel_hide(&mut self) {
        if let Some(task) = self.hide_task.take() {
            task.abort();
        }
    }
}

#[derive(Debug, Default)]
pub struct SubmissionCoordinator {
    state: SubmissionState,
    submit_count: u32,
    last_submitted: Option<Submission>,
    banner: BannerState,
}

impl SubmissionCoordinator {
    pub fn state(&self) -> SubmissionState {
        self.state
    }

    /// Number of submit attempts that got past the single-flight guard
    #[allow(dead_code)]
    pub fn submit_count(&self) -> u32 {
        self.submit_count
    }

    pub fn last_submitted(&self) -> Option<&Submission> {
        self.last_submitted.as_ref()
    }

    pub fn banner_visible(&self) -> bool {
        self.banner.visible
    }

    /// Time left before the banner hides on its own
    pub fn banner_remaining(&self, timeout: Duration) -> Option<Duration> {
        if !self.banner.visible {
            return None;
        }
        let shown_at = self.banner.shown_at?;
        Some(timeout.saturating_sub(shown_at.elapsed()))
    }

    pub fn transition(&mut self, next: SubmissionState) -> FormResult<()> {
        let current = self.state;
        if current == next {
            return Ok(());
        }

        let allowed = matches!(
            (current, next),
            (SubmissionState::Idle, SubmissionState::Validating)
                | (SubmissionState::Succeeded, SubmissionState::Validating)
                | (SubmissionState::Validating, SubmissionState::Submitting)
                | (SubmissionState::Validating, SubmissionState::Idle)
                | (SubmissionState::Submitting, SubmissionState::Succeeded)
                | (SubmissionState::Submitting, SubmissionState::Idle)
                | (SubmissionState::Succeeded, SubmissionState::Idle)
        );
        if !allowed {
            return Err(FormError::InvalidStateTransition {
                from: current,
                to: next,
            });
        }
        tracing::debug!(from = current.label(), to = next.label(), "submission state");
        self.state = next;
        Ok(())
    }

    /// Enter `Validating`. Returns `false` without touching anything when a
    /// submission is already in flight.
    pub fn begin(&mut self) -> FormResult<bool> {
        if self.state.is_in_flight() {
            tracing::debug!(state = self.state.label(), "submit ignored, already in flight");
            return Ok(false);
        }
        if self.state == SubmissionState::Succeeded {
            self.close_banner()?;
        }
        self.transition(SubmissionState::Validating)?;
        self.submit_count = self.submit_count.saturating_add(1);
        Ok(true)
    }

    /// Record the snapshot and raise the banner. Returns the banner
    /// generation the auto-hide task must present to [`Self::expire_banner`].
    pub fn succeed(&mut self, data: SignUpFormData) -> FormResult<(Submission, u64)> {
        self.transition(SubmissionState::Succeeded)?;
        let submission = Submission::new(data);
        self.last_submitted = Some(submission.clone());
        let generation = self.banner.show();
        Ok((submission, generation))
    }

    pub fn arm_auto_hide(&mut self, task: JoinHandle<()>) {
        self.banner.cancel_hide();
        self.banner.hide_task = Some(task);
    }

    /// Explicit close. Returns whether the banner was showing.
    pub fn close_banner(&mut self) -> FormResult<bool> {
        let was_visible = self.banner.visible;
        self.banner.cancel_hide();
        self.banner.hide();
        if self.state == SubmissionState::Succeeded {
            self.transition(SubmissionState::Idle)?;
        }
        Ok(was_visible)
    }

    /// Timer-driven hide; ignored unless `generation` is still current.
    pub fn expire_banner(&mut self, generation: u64) -> FormResult<bool> {
        if generation != self.banner.generation || !self.banner.visible {
            return Ok(false);
        }
        // The caller is the hide task itself, so release the handle rather than abort it
        self.banner.hide_task.take();
        self.banner.hide();
        if self.state == SubmissionState::Succeeded {
            self.transition(SubmissionState::Idle)?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn succeeded() -> (SubmissionCoordinator, u64) {
        let mut coordinator = SubmissionCoordinator::default();
        assert!(coordinator.begin().unwrap());
        coordinator.transition(SubmissionState::Submitting).unwrap();
        let (_, generation) = coordinator
            .succeed(SignUpFormData::new("validUser1", "user@example.com"))
            .unwrap();
        (coordinator, generation)
    }

    mod transitions {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_default_is_idle() {
            assert_eq!(SubmissionCoordinator::default().state(), SubmissionState::Idle);
        }

        #[test]
        fn test_same_state_is_noop() {
            let mut coordinator = SubmissionCoordinator::default();
            assert!(coordinator.transition(SubmissionState::Idle).is_ok());
        }

        #[test]
        fn test_idle_cannot_jump_to_submitting() {
            let mut coordinator = SubmissionCoordinator::default();
            assert_eq!(
                coordinator.transition(SubmissionState::Submitting),
                Err(FormError::InvalidStateTransition {
                    from: SubmissionState::Idle,
                    to: SubmissionState::Submitting,
                })
            );
        }

        #[test]
        fn test_idle_cannot_jump_to_succeeded() {
            let mut coordinator = SubmissionCoordinator::default();
            assert!(coordinator.transition(SubmissionState::Succeeded).is_err());
        }

        #[test]
        fn test_validating_can_abort_to_idle() {
            let mut coordinator = SubmissionCoordinator::default();
            coordinator.begin().unwrap();
            coordinator.transition(SubmissionState::Idle).unwrap();
            assert_eq!(coordinator.state(), SubmissionState::Idle);
        }
    }

    mod single_flight {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_begin_counts_attempts() {
            let mut coordinator = SubmissionCoordinator::default();
            assert!(coordinator.begin().unwrap());
            assert_eq!(coordinator.state(), SubmissionState::Validating);
            assert_eq!(coordinator.submit_count(), 1);
        }

        #[test]
        fn test_begin_while_validating_is_ignored() {
            let mut coordinator = SubmissionCoordinator::default();
            coordinator.begin().unwrap();
            assert!(!coordinator.begin().unwrap());
            assert_eq!(coordinator.submit_count(), 1);
        }

        #[test]
        fn test_begin_while_submitting_is_ignored() {
            let mut coordinator = SubmissionCoordinator::default();
            coordinator.begin().unwrap();
            coordinator.transition(SubmissionState::Submitting).unwrap();
            assert!(!coordinator.begin().unwrap());
            assert_eq!(coordinator.state(), SubmissionState::Submitting);
        }

        #[test]
        fn test_begin_from_succeeded_closes_banner() {
            let (mut coordinator, _) = succeeded();
            assert!(coordinator.begin().unwrap());
            assert!(!coordinator.banner_visible());
            assert_eq!(coordinator.state(), SubmissionState::Validating);
        }
    }

    mod banner {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_succeed_shows_banner_and_records_snapshot() {
            let (coordinator, generation) = succeeded();
            assert!(coordinator.banner_visible());
            assert_eq!(generation, 1);
            assert_eq!(
                coordinator.last_submitted().map(|s| s.data.clone()),
                Some(SignUpFormData::new("validUser1", "user@example.com"))
            );
        }

        #[test]
        fn test_close_returns_to_idle() {
            let (mut coordinator, _) = succeeded();
            assert!(coordinator.close_banner().unwrap());
            assert!(!coordinator.banner_visible());
            assert_eq!(coordinator.state(), SubmissionState::Idle);
        }

        #[test]
        fn test_close_when_hidden_reports_false() {
            let mut coordinator = SubmissionCoordinator::default();
            assert!(!coordinator.close_banner().unwrap());
        }

        #[test]
        fn test_expire_with_current_generation_hides() {
            let (mut coordinator, generation) = succeeded();
            assert!(coordinator.expire_banner(generation).unwrap());
            assert!(!coordinator.banner_visible());
            assert_eq!(coordinator.state(), SubmissionState::Idle);
        }

        #[test]
        fn test_expire_with_stale_generation_is_ignored() {
            let (mut coordinator, generation) = succeeded();
            assert!(!coordinator.expire_banner(generation + 1).unwrap());
            assert!(coordinator.banner_visible());
        }

        #[test]
        fn test_last_submitted_survives_hide() {
            let (mut coordinator, _) = succeeded();
            coordinator.close_banner().unwrap();
            assert!(coordinator.last_submitted().is_some());
        }

        #[tokio::test(start_paused = true)]
        async fn test_remaining_counts_down() {
            let (coordinator, _) = succeeded();
            let timeout = Duration::from_millis(5000);
            tokio::time::advance(Duration::from_millis(2000)).await;
            assert_eq!(
                coordinator.banner_remaining(timeout),
                Some(Duration::from_millis(3000))
            );
        }

        #[test]
        fn test_remaining_is_none_when_hidden() {
            let coordinator = SubmissionCoordinator::default();
            assert_eq!(coordinator.banner_remaining(Duration::from_secs(5)), None);
        }
    }
}
