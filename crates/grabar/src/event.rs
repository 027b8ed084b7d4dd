//! DOM events fed to the recorder.

use serde::{Deserialize, Serialize};

use crate::dom::NodeId;

/// Keys recorded as `keydown` actions; other keys reach the page as input
pub const SPECIAL_KEYS: &[&str] = &["Enter", "Tab", "Escape"];

/// DOM event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomEventKind {
    /// Page load (navigation)
    Load,
    /// Click
    Click,
    /// Text input
    Input,
    /// Change (select, checkbox, radio, file)
    Change,
    /// Key down
    Keydown,
}

/// A DOM event as the page delivered it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomEvent {
    /// Event type
    pub kind: DomEventKind,
    /// Target node, absent for `load`
    #[serde(default)]
    pub target: Option<NodeId>,
    /// Current value of the target (input text, selected option, ...)
    #[serde(default)]
    pub value: Option<String>,
    /// Key name for `keydown`
    #[serde(default)]
    pub key: Option<String>,
    /// Page URL for `load`
    #[serde(default)]
    pub url: Option<String>,
    /// Unix epoch milliseconds; the recorder stamps the current time if absent
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl DomEvent {
    fn on(kind: DomEventKind, target: NodeId) -> Self {
        Self {
            kind,
            target: Some(target),
            value: None,
            key: None,
            url: None,
            timestamp: None,
        }
    }

    /// Page load
    #[must_use]
    pub fn load(url: impl Into<String>) -> Self {
        Self {
            kind: DomEventKind::Load,
            target: None,
            value: None,
            key: None,
            url: Some(url.into()),
            timestamp: None,
        }
    }

    /// Click on `target`
    #[must_use]
    pub fn click(target: NodeId) -> Self {
        Self::on(DomEventKind::Click, target)
    }

    /// Input into `target`
    #[must_use]
    pub fn input(target: NodeId, value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::on(DomEventKind::Input, target)
        }
    }

    /// Change on `target`
    #[must_use]
    pub fn change(target: NodeId, value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::on(DomEventKind::Change, target)
        }
    }

    /// Key down on `target`
    #[must_use]
    pub fn keydown(target: NodeId, key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::on(DomEventKind::Keydown, target)
        }
    }

    /// Set the timestamp
    #[must_use]
    pub const fn at(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Whether this is a `keydown` for one of [`SPECIAL_KEYS`]
    #[must_use]
    pub fn is_special_key(&self) -> bool {
        self.key
            .as_deref()
            .is_some_and(|key| SPECIAL_KEYS.contains(&key))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_special_keys() {
        let node = crate::dom::Document::new().root();
        assert!(DomEvent::keydown(node, "Enter").is_special_key());
        assert!(DomEvent::keydown(node, "Escape").is_special_key());
        assert!(!DomEvent::keydown(node, "a").is_special_key());
        assert!(!DomEvent::keydown(node, "enter").is_special_key());
        assert!(!DomEvent::click(node).is_special_key());
    }

    #[test]
    fn test_deserialize_minimal() {
        let event: DomEvent = serde_json::from_str(r#"{"kind":"load","url":"https://a.example"}"#).unwrap();
        assert_eq!(event, DomEvent::load("https://a.example"));
    }

    #[test]
    fn test_at_sets_timestamp() {
        let event = DomEvent::load("https://a.example").at(42);
        assert_eq!(event.timestamp, Some(42));
    }
}
