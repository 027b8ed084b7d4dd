//! Recorder: DOM events in, action records out.
//!
//! | Event                       | Record                    |
//! |-----------------------------|---------------------------|
//! | `load`                      | `navigate` with the URL   |
//! | `click`                     | `click`                   |
//! | `input`                     | `input` with the value    |
//! | `change` on `<select>`      | `select` with the value   |
//! | `change` elsewhere          | `change` with the value   |
//! | `keydown` Enter/Tab/Escape  | `keydown` with the key    |
//!
//! Anything else, and every event while the session is idle, is dropped.

use crate::action::{now_millis, ActionRecord, ActionType};
use crate::dom::Document;
use crate::event::{DomEvent, DomEventKind};
use crate::locator::{LocatorConfig, LocatorSynthesizer};
use crate::result::GrabarResult;
use crate::session::RecordingSession;

/// Binds a session to a locator synthesizer
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    session: RecordingSession,
    synthesizer: LocatorSynthesizer,
}

impl Recorder {
    /// Recorder with the given locator options
    #[must_use]
    pub fn new(config: LocatorConfig) -> Self {
        Self {
            session: RecordingSession::new(),
            synthesizer: LocatorSynthesizer::new(config),
        }
    }

    /// Underlying session
    #[must_use]
    pub const fn session(&self) -> &RecordingSession {
        &self.session
    }

    /// Underlying session, mutably
    pub fn session_mut(&mut self) -> &mut RecordingSession {
        &mut self.session
    }

    /// Start recording on `url`
    pub fn start(&mut self, url: Option<&str>) -> GrabarResult<()> {
        self.session.start(url)
    }

    /// Stop recording and take the sequence
    pub fn stop(&mut self) -> GrabarResult<Vec<ActionRecord>> {
        self.session.stop()
    }

    /// Handle one event against the snapshot it fired on.
    ///
    /// Returns the appended record, or `None` when the event was ignored or
    /// suppressed.
    pub fn handle(&mut self, doc: &Document, event: &DomEvent) -> GrabarResult<Option<ActionRecord>> {
        if !self.session.is_recording() {
            tracing::debug!(kind = ?event.kind, "not recording, event dropped");
            return Ok(None);
        }
        let Some(record) = self.translate(doc, event)? else {
            return Ok(None);
        };
        let appended = self.session.record(record.clone())?;
        Ok(appended.then_some(record))
    }

    fn translate(&self, doc: &Document, event: &DomEvent) -> GrabarResult<Option<ActionRecord>> {
        let timestamp = event.timestamp.unwrap_or_else(now_millis);

        if event.kind == DomEventKind::Load {
            let Some(url) = event.url.as_deref() else {
                tracing::warn!("load event without a URL ignored");
                return Ok(None);
            };
            return Ok(Some(ActionRecord::navigate(url).with_timestamp(timestamp)));
        }

        let Some(target) = event.target.filter(|node| doc.is_element(*node)) else {
            tracing::warn!(kind = ?event.kind, "event without an element target ignored");
            return Ok(None);
        };

        let (action_type, value) = match event.kind {
            DomEventKind::Click => (ActionType::Click, None),
            DomEventKind::Input => (ActionType::Input, event.value.clone()),
            DomEventKind::Change if doc.tag_name(target) == Some("select") => {
                (ActionType::Select, event.value.clone())
            }
            DomEventKind::Change => (ActionType::Change, event.value.clone()),
            DomEventKind::Keydown if event.is_special_key() => {
                (ActionType::Keydown, event.key.clone())
            }
            DomEventKind::Keydown | DomEventKind::Load => return Ok(None),
        };

        let locator = self.synthesizer.synthesize(doc, target)?;
        let mut record = ActionRecord::new(action_type, locator).with_timestamp(timestamp);
        record.value = value;
        Ok(Some(record))
    }
}
