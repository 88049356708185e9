//! Application state and core logic

use crate::config::SignupConfig;
use crate::remote::{SimulatedRemote, SubmitRemote};
use crate::state::{Field, FormController, FormOptions, FormResult, SubmitOutcome};
use anyhow::{anyhow, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Focusable rows of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusTarget {
    #[default]
    Username,
    Email,
    SubmitButton,
}

impl FocusTarget {
    pub fn next(self) -> Self {
        match self {
            Self::Username => Self::Email,
            Self::Email => Self::SubmitButton,
            Self::SubmitButton => Self::Username,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Username => Self::SubmitButton,
            Self::Email => Self::Username,
            Self::SubmitButton => Self::Email,
        }
    }

    /// The field behind this row, if it is one
    pub fn field(self) -> Option<Field> {
        match self {
            Self::Username => Some(Field::Username),
            Self::Email => Some(Field::Email),
            Self::SubmitButton => None,
        }
    }
}

/// Main application struct
pub struct App {
    /// Sign-up form state
    pub form: FormController,
    /// Focused row
    pub focus: FocusTarget,
    /// Status message for outcomes the form itself does not show
    pub status_message: Option<String>,
    /// Whether the app should quit
    quit: bool,
    /// Submit cycles spawned on the runtime, oldest first
    submit_tasks: Vec<JoinHandle<FormResult<SubmitOutcome>>>,
}

impl App {
    /// Create the app against the simulated backend described by `config`
    pub fn new(config: &SignupConfig) -> Self {
        Self::with_remote(
            Arc::new(SimulatedRemote::from_config(config)),
            FormOptions::from_config(config),
        )
    }

    pub fn with_remote(remote: Arc<dyn SubmitRemote>, options: FormOptions) -> Self {
        Self {
            form: FormController::new(remote, options),
            focus: FocusTarget::default(),
            status_message: None,
            quit: false,
            submit_tasks: Vec::new(),
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn quit(&mut self) {
        self.quit = true;
    }

    /// Whether a spawned submit cycle has not been collected yet
    pub fn has_pending_submit(&self) -> bool {
        !self.submit_tasks.is_empty()
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('s') if ctrl => self.trigger_submit(),
            KeyCode::Esc => {
                if !self.form.close_banner()? {
                    self.quit();
                }
            }
            KeyCode::Tab | KeyCode::Down => self.move_focus(self.focus.next())?,
            KeyCode::BackTab | KeyCode::Up => self.move_focus(self.focus.prev())?,
            KeyCode::Enter => match self.focus.field() {
                Some(_) => self.move_focus(self.focus.next())?,
                None => self.trigger_submit(),
            },
            KeyCode::Char(c) if !ctrl => {
                if let Some(field) = self.focus.field() {
                    self.status_message = None;
                    self.form.input_char(field, c)?;
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = self.focus.field() {
                    self.form.backspace(field)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Leaving a field marks it touched
    fn move_focus(&mut self, next: FocusTarget) -> Result<()> {
        if let Some(field) = self.focus.field() {
            self.form.touch(field)?;
        }
        self.focus = next;
        Ok(())
    }

    /// Start a submit cycle without blocking the draw loop. The form
    /// turns any overlapping cycle into a no-op.
    pub fn trigger_submit(&mut self) {
        let form = self.form.clone();
        self.submit_tasks
            .push(tokio::spawn(async move { form.submit().await }));
    }

    /// Collect finished submit cycles and surface their outcome
    pub async fn poll_submissions(&mut self) -> Result<()> {
        while self
            .submit_tasks
            .first()
            .is_some_and(|task| task.is_finished())
        {
            let task = self.submit_tasks.remove(0);
            let outcome = task
                .await
                .map_err(|e| anyhow!("submit task failed: {e}"))??;
            self.apply_outcome(outcome);
        }
        Ok(())
    }

    fn apply_outcome(&mut self, outcome: SubmitOutcome) {
        match outcome {
            SubmitOutcome::Ignored => {}
            SubmitOutcome::Invalid(failures) => {
                if let Some(first) = failures.first() {
                    self.focus = match first.field {
                        Field::Username => FocusTarget::Username,
                        Field::Email => FocusTarget::Email,
                    };
                }
                self.status_message = Some("Fix the highlighted fields".to_string());
            }
            SubmitOutcome::Submitted(_) => {
                self.focus = FocusTarget::Username;
                self.status_message = None;
            }
            SubmitOutcome::Rejected(_) => {
                self.status_message = Some("Sign-up rejected by server".to_string());
            }
            // Shown by the form as its non-field error
            SubmitOutcome::Failed(_) => self.status_message = None,
        }
    }
}
