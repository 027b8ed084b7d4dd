//! Recording session: owns the ordered action sequence.
//!
//! The sequence lives only as long as the session records. `stop` hands it
//! to the caller and leaves the session empty; nothing is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action::ActionRecord;
use crate::result::{GrabarError, GrabarResult};

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Not recording
    #[default]
    Idle,
    /// Capturing events
    Recording,
}

/// A single recording session
#[derive(Debug, Clone)]
pub struct RecordingSession {
    id: Uuid,
    state: SessionState,
    started_at: Option<DateTime<Utc>>,
    start_url: Option<String>,
    actions: Vec<ActionRecord>,
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSession {
    /// Create an idle session
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Idle,
            started_at: None,
            start_url: None,
            actions: Vec::new(),
        }
    }

    /// Session id; a fresh one is assigned on every start
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Whether events are being captured
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.state == SessionState::Recording
    }

    /// When the current recording started
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// URL the current recording started on
    #[must_use]
    pub fn start_url(&self) -> Option<&str> {
        self.start_url.as_deref()
    }

    /// Recorded actions, oldest first
    #[must_use]
    pub fn actions(&self) -> &[ActionRecord] {
        &self.actions
    }

    /// Number of recorded actions
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Begin recording, capturing the implicit navigate to `url`
    pub fn start(&mut self, url: Option<&str>) -> GrabarResult<()> {
        if self.is_recording() {
            return Err(GrabarError::invalid_state("already recording"));
        }
        self.id = Uuid::new_v4();
        self.state = SessionState::Recording;
        self.started_at = Some(Utc::now());
        self.start_url = url.map(str::to_string);
        self.actions.clear();
        tracing::info!(session = %self.id, url = url.unwrap_or(""), "recording started");

        if let Some(url) = url {
            self.actions.push(ActionRecord::navigate(url));
        }
        Ok(())
    }

    /// Append a record; returns `false` when it was suppressed as a
    /// duplicate of the initial navigate.
    ///
    /// Records no script target can express are rejected and not stored.
    pub fn record(&mut self, action: ActionRecord) -> GrabarResult<bool> {
        if !self.is_recording() {
            return Err(GrabarError::invalid_state("not recording"));
        }
        if let Err(err) = action.validate() {
            tracing::warn!(%err, "action rejected");
            return Err(err);
        }
        if action.is_navigate() && self.repeats_initial_navigate(&action) {
            tracing::warn!(url = action.url.as_deref().unwrap_or(""), "duplicate navigate suppressed");
            return Ok(false);
        }
        tracing::debug!(action = %action.action_type, selector = action.selector.as_str(), "recorded");
        self.actions.push(action);
        Ok(true)
    }

    fn repeats_initial_navigate(&self, action: &ActionRecord) -> bool {
        self.actions
            .first()
            .is_some_and(|first| first.is_navigate() && first.url == action.url)
    }

    /// Stop recording and take the sequence
    pub fn stop(&mut self) -> GrabarResult<Vec<ActionRecord>> {
        if !self.is_recording() {
            return Err(GrabarError::invalid_state("not recording"));
        }
        self.state = SessionState::Idle;
        let actions = std::mem::take(&mut self.actions);
        tracing::info!(session = %self.id, count = actions.len(), "recording stopped");
        Ok(actions)
    }

    /// Drop every recorded action, in either state
    pub fn clear(&mut self) {
        self.actions.clear();
    }
}
