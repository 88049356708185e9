//! Sign-up form controller
//!
//! Cloneable handle that ties the field model, the validation rules and
//! the submission lifecycle together. The UI binds field input through
//! [`FormController::input_char`] and friends, triggers [`FormController::submit`],
//! and reads back error strings, banner visibility and the last
//! submitted snapshot. Listeners registered with
//! [`FormController::subscribe`] are told about every change.

use super::error::{FormError, FormResult};
use super::field::{Field, FieldModel, SignUpFormData};
use super::submission::{Submission, SubmissionCoordinator, SubmissionState};
use super::validation::{field_failures, select_message, FieldFailure, ValidationFailure};
use crate::config::SignupConfig;
use crate::remote::{SubmitError, SubmitRemote};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

/// Non-field error left behind when a submit is abandoned mid-call
pub const CANCELLED_MESSAGE: &str = "submission cancelled";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormOptions {
    pub banner_timeout: Duration,
    /// `None` waits on the backend indefinitely
    pub submit_timeout: Option<Duration>,
}

impl FormOptions {
    pub fn from_config(config: &SignupConfig) -> Self {
        Self {
            banner_timeout: config.banner_timeout(),
            submit_timeout: config.submit_timeout(),
        }
    }
}

impl Default for FormOptions {
    fn default() -> Self {
        Self::from_config(&SignupConfig::default())
    }
}

/// Change notifications delivered to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    FieldChanged { field: Field, value: String },
    FieldTouched(Field),
    StateChanged(SubmissionState),
    BannerChanged { visible: bool },
    /// Both fields were cleared after a successful submit
    Reset,
}

/// What a call to [`FormController::submit`] ended up doing
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Another submission was already in flight
    Ignored,
    /// Local validation failed, the backend was not called
    Invalid(Vec<FieldFailure>),
    Submitted(Submission),
    /// The backend refused specific fields
    Rejected(Vec<FieldFailure>),
    /// The backend call failed outright
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&FormEvent) + Send + Sync>;

/// Everything the UI needs for one frame, read under a single lock
#[derive(Debug, Clone)]
pub struct FormSnapshot {
    pub values: SignUpFormData,
    pub visible_errors: BTreeMap<Field, String>,
    pub state: SubmissionState,
    pub banner_visible: bool,
    pub banner_remaining: Option<Duration>,
    pub banner_timeout: Duration,
    pub last_submitted: Option<Submission>,
    pub form_error: Option<String>,
}

impl FormSnapshot {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Username => &self.values.username,
            Field::Email => &self.values.email,
        }
    }

    pub fn visible_error(&self, field: Field) -> &str {
        self.visible_errors
            .get(&field)
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[derive(Default)]
struct FormInner {
    fields: FieldModel,
    submission: SubmissionCoordinator,
    server_failures: BTreeMap<Field, Vec<ValidationFailure>>,
    /// Failure not tied to a field
    form_error: Option<String>,
}

impl FormInner {
    fn local_failures(&self, field: Field) -> Vec<ValidationFailure> {
        field_failures(field, self.fields.get(field))
    }

    fn failures(&self, field: Field) -> Vec<ValidationFailure> {
        let mut failures = self.local_failures(field);
        if let Some(server) = self.server_failures.get(&field) {
            failures.extend(server.iter().cloned());
        }
        failures
    }

    fn all_local_failures(&self) -> Vec<FieldFailure> {
        Field::ALL
            .into_iter()
            .flat_map(|field| {
                self.local_failures(field)
                    .into_iter()
                    .map(move |failure| FieldFailure::new(field, failure))
            })
            .collect()
    }

    fn error_message(&self, field: Field) -> String {
        select_message(&self.failures(field)).to_string()
    }

    fn visible_error(&self, field: Field) -> String {
        if self.fields.is_touched(field) {
            self.error_message(field)
        } else {
            String::new()
        }
    }
}

#[derive(Clone, Default)]
struct Listeners {
    next_id: Arc<AtomicU64>,
    entries: Arc<Mutex<BTreeMap<SubscriptionId, Listener>>>,
}

impl Listeners {
    /// Call every listener; must not be called with the form lock held
    fn emit(&self, events: &[FormEvent]) {
        if events.is_empty() {
            return;
        }
        let listeners: Vec<Listener> = match self.entries.lock() {
            Ok(entries) => entries.values().cloned().collect(),
            Err(_) => {
                tracing::warn!("listener registry poisoned, dropping {} event(s)", events.len());
                return;
            }
        };
        for event in events {
            for listener in &listeners {
                listener(event);
            }
        }
    }
}

#[derive(Clone)]
pub struct FormController {
    options: FormOptions,
    remote: Arc<dyn SubmitRemote>,
    inner: Arc<Mutex<FormInner>>,
    listeners: Listeners,
}

impl FormController {
    pub fn new(remote: Arc<dyn SubmitRemote>, options: FormOptions) -> Self {
        Self {
            options,
            remote,
            inner: Arc::new(Mutex::new(FormInner::default())),
            listeners: Listeners::default(),
        }
    }

    pub fn subscribe(
        &self,
        listener: impl Fn(&FormEvent) + Send + Sync + 'static,
    ) -> FormResult<SubscriptionId> {
        let id = SubscriptionId(self.listeners.next_id.fetch_add(1, Ordering::SeqCst));
        self.listeners
            .entries
            .lock()
            .map_err(|_| FormError::StatePoisoned("registering listener"))?
            .insert(id, Arc::new(listener));
        Ok(id)
    }

    pub fn input_char(&self, field: Field, c: char) -> FormResult<()> {
        self.edit(field, |fields| fields.push_char(field, c))
    }

    pub fn backspace(&self, field: Field) -> FormResult<()> {
        self.edit(field, |fields| fields.pop_char(field))
    }

    /// Mark a field as interacted with so its errors become visible
    pub fn touch(&self, field: Field) -> FormResult<()> {
        let newly_touched = {
            let mut inner = self.lock("touching field")?;
            let was = inner.fields.is_touched(field);
            inner.fields.touch(field);
            !was
        };
        if newly_touched {
            self.listeners.emit(&[FormEvent::FieldTouched(field)]);
        }
        Ok(())
    }

    pub fn banner_visible(&self) -> FormResult<bool> {
        Ok(self.lock("reading banner")?.submission.banner_visible())
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot> {
        let inner = self.lock("creating form snapshot")?;
        Ok(FormSnapshot {
            values: inner.fields.snapshot(),
            visible_errors: Field::ALL
                .into_iter()
                .map(|field| (field, inner.visible_error(field)))
                .collect(),
            state: inner.submission.state(),
            banner_visible: inner.submission.banner_visible(),
            banner_remaining: inner.submission.banner_remaining(self.options.banner_timeout),
            banner_timeout: self.options.banner_timeout,
            last_submitted: inner.submission.last_submitted().cloned(),
            form_error: inner.form_error.clone(),
        })
    }

    /// Hide the success banner now and cancel its auto-hide.
    /// Returns whether it was showing.
    pub fn close_banner(&self) -> FormResult<bool> {
        let was_visible = self.lock("closing banner")?.submission.close_banner()?;
        if was_visible {
            self.listeners.emit(&[
                FormEvent::BannerChanged { visible: false },
                FormEvent::StateChanged(SubmissionState::Idle),
            ]);
        }
        Ok(was_visible)
    }

    /// Run one submit cycle: validate, call the backend, then record the
    /// result. A call made while another cycle is in flight returns
    /// [`SubmitOutcome::Ignored`] without side effects. Dropping the
    /// returned future mid-call puts the form back to idle.
    pub async fn submit(&self) -> FormResult<SubmitOutcome> {
        let mut events = Vec::new();
        let data = {
            let mut inner = self.lock("preparing submit")?;
            let banner_was_visible = inner.submission.banner_visible();
            if !inner.submission.begin()? {
                return Ok(SubmitOutcome::Ignored);
            }
            if banner_was_visible {
                events.push(FormEvent::BannerChanged { visible: false });
            }
            events.push(FormEvent::StateChanged(SubmissionState::Validating));
            inner.form_error = None;
            inner.fields.touch_all();

            let failures = inner.all_local_failures();
            if !failures.is_empty() {
                inner.submission.transition(SubmissionState::Idle)?;
                drop(inner);
                tracing::debug!(failures = failures.len(), "submit blocked by validation");
                events.push(FormEvent::StateChanged(SubmissionState::Idle));
                self.listeners.emit(&events);
                return Ok(SubmitOutcome::Invalid(failures));
            }

            inner.submission.transition(SubmissionState::Submitting)?;
            inner.fields.snapshot()
        };
        let in_flight = InFlight::arm(self);
        events.push(FormEvent::StateChanged(SubmissionState::Submitting));
        self.listeners.emit(&events);

        let result = self.call_remote(&data).await;
        in_flight.disarm();
        self.finish(data, result)
    }

    async fn call_remote(&self, data: &SignUpFormData) -> Result<(), SubmitError> {
        match self.options.submit_timeout {
            Some(limit) => tokio::time::timeout(limit, self.remote.submit(data))
                .await
                .unwrap_or_else(|_| {
                    Err(SubmitError::Transport(format!(
                        "no response within {}ms",
                        limit.as_millis()
                    )))
                }),
            None => self.remote.submit(data).await,
        }
    }

    fn finish(
        &self,
        data: SignUpFormData,
        result: Result<(), SubmitError>,
    ) -> FormResult<SubmitOutcome> {
        let mut inner = self.lock("completing submit")?;
        match result {
            Ok(()) => {
                let (submission, generation) = inner.submission.succeed(data)?;
                inner.fields.reset();
                inner.server_failures.clear();
                let task = tokio::spawn(auto_hide(
                    Arc::downgrade(&self.inner),
                    self.listeners.clone(),
                    self.options.banner_timeout,
                    generation,
                ));
                inner.submission.arm_auto_hide(task);
                drop(inner);

                tracing::info!(id = %submission.id, username = %submission.data.username, "sign-up submitted");
                self.listeners.emit(&[
                    FormEvent::StateChanged(SubmissionState::Succeeded),
                    FormEvent::Reset,
                    FormEvent::BannerChanged { visible: true },
                ]);
                Ok(SubmitOutcome::Submitted(submission))
            }
            Err(SubmitError::Rejected(failures)) => {
                inner.submission.transition(SubmissionState::Idle)?;
                inner.server_failures.clear();
                for failure in &failures {
                    inner.fields.touch(failure.field);
                    inner
                        .server_failures
                        .entry(failure.field)
                        .or_default()
                        .push(failure.failure.clone());
                }
                drop(inner);

                tracing::warn!(failures = failures.len(), "sign-up rejected by server");
                self.listeners
                    .emit(&[FormEvent::StateChanged(SubmissionState::Idle)]);
                Ok(SubmitOutcome::Rejected(failures))
            }
            Err(SubmitError::Transport(reason)) => {
                inner.submission.transition(SubmissionState::Idle)?;
                let message = format!("submission failed: {reason}");
                inner.form_error = Some(message.clone());
                drop(inner);

                tracing::warn!("{message}");
                self.listeners
                    .emit(&[FormEvent::StateChanged(SubmissionState::Idle)]);
                Ok(SubmitOutcome::Failed(message))
            }
        }
    }

    /// Back out of `Submitting` when a submit future is dropped mid-call
    fn cancel_in_flight(&self) {
        let cancelled = match self.inner.lock() {
            Ok(mut inner) if inner.submission.state() == SubmissionState::Submitting => {
                match inner.submission.transition(SubmissionState::Idle) {
                    Ok(()) => {
                        inner.form_error = Some(CANCELLED_MESSAGE.to_string());
                        true
                    }
                    Err(error) => {
                        tracing::warn!("{error}");
                        false
                    }
                }
            }
            Ok(_) => false,
            Err(_) => {
                tracing::warn!("form state poisoned, cannot cancel submit");
                false
            }
        };
        if cancelled {
            tracing::warn!("submit cancelled before the backend answered");
            self.listeners
                .emit(&[FormEvent::StateChanged(SubmissionState::Idle)]);
        }
    }

    fn edit(&self, field: Field, apply: impl FnOnce(&mut FieldModel)) -> FormResult<()> {
        let value = {
            let mut inner = self.lock("writing field value")?;
            apply(&mut inner.fields);
            inner.server_failures.remove(&field);
            inner.fields.get(field).to_string()
        };
        self.listeners
            .emit(&[FormEvent::FieldChanged { field, value }]);
        Ok(())
    }

    fn lock(&self, context: &'static str) -> FormResult<MutexGuard<'_, FormInner>> {
        self.inner
            .lock()
            .map_err(|_| FormError::StatePoisoned(context))
    }
}

/// Per-field queries and whole-value edits; the UI reads through
/// [`FormController::snapshot`] instead
#[allow(dead_code)]
impl FormController {
    pub fn unsubscribe(&self, id: SubscriptionId) -> FormResult<bool> {
        Ok(self
            .listeners
            .entries
            .lock()
            .map_err(|_| FormError::StatePoisoned("removing listener"))?
            .remove(&id)
            .is_some())
    }

    /// Replace a field's value; clears that field's server failures
    pub fn set(&self, field: Field, value: impl Into<String>) -> FormResult<()> {
        let value = value.into();
        self.edit(field, |fields| fields.set(field, value))
    }

    pub fn value(&self, field: Field) -> FormResult<String> {
        Ok(self.lock("reading field value")?.fields.get(field).to_string())
    }

    pub fn is_touched(&self, field: Field) -> FormResult<bool> {
        Ok(self.lock("reading touched flag")?.fields.is_touched(field))
    }

    /// Local failures followed by any server failures for the field
    pub fn failures(&self, field: Field) -> FormResult<Vec<ValidationFailure>> {
        Ok(self.lock("reading field failures")?.failures(field))
    }

    /// Highest-priority message regardless of touched state
    pub fn error_message(&self, field: Field) -> FormResult<String> {
        Ok(self.lock("reading error message")?.error_message(field))
    }

    /// Message to display: empty until the field has been touched
    pub fn visible_error(&self, field: Field) -> FormResult<String> {
        Ok(self.lock("reading visible error")?.visible_error(field))
    }

    /// Whether local validation passes for every field
    pub fn is_valid(&self) -> FormResult<bool> {
        Ok(self
            .lock("checking form validity")?
            .all_local_failures()
            .is_empty())
    }

    pub fn submission_state(&self) -> FormResult<SubmissionState> {
        Ok(self.lock("reading submission state")?.submission.state())
    }

    pub fn submit_count(&self) -> FormResult<u32> {
        Ok(self.lock("reading submit count")?.submission.submit_count())
    }

    pub fn banner_remaining(&self) -> FormResult<Option<Duration>> {
        Ok(self
            .lock("reading banner countdown")?
            .submission
            .banner_remaining(self.options.banner_timeout))
    }

    pub fn last_submitted(&self) -> FormResult<Option<Submission>> {
        Ok(self
            .lock("reading last submission")?
            .submission
            .last_submitted()
            .cloned())
    }

    pub fn form_error(&self) -> FormResult<Option<String>> {
        Ok(self.lock("reading form error")?.form_error.clone())
    }
}

/// Armed while a backend call is outstanding
struct InFlight<'a> {
    form: Option<&'a FormController>,
}

impl<'a> InFlight<'a> {
    fn arm(form: &'a FormController) -> Self {
        Self { form: Some(form) }
    }

    fn disarm(mut self) {
        self.form = None;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(form) = self.form.take() {
            form.cancel_in_flight();
        }
    }
}

async fn auto_hide(
    inner: Weak<Mutex<FormInner>>,
    listeners: Listeners,
    timeout: Duration,
    generation: u64,
) {
    tokio::time::sleep(timeout).await;
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let hidden = match inner.lock() {
        Ok(mut inner) => inner.submission.expire_banner(generation),
        Err(_) => Err(FormError::StatePoisoned("auto-hiding banner")),
    };
    match hidden {
        Ok(true) => {
            tracing::debug!(generation, "banner auto-hidden");
            listeners.emit(&[
                FormEvent::BannerChanged { visible: false },
                FormEvent::StateChanged(SubmissionState::Idle),
            ]);
        }
        Ok(false) => {}
        Err(error) => tracing::warn!("{error}"),
    }
}
