//! Recorded actions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::event::SPECIAL_KEYS;
use crate::locator::{Locator, LocatorKind};
use crate::result::{GrabarError, GrabarResult};

/// Selector carried by navigate records
pub const NAVIGATE_SELECTOR: &str = "/html";

/// Kind of captured interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    /// Page load or navigation
    Navigate,
    /// Mouse click
    Click,
    /// Text typed into a field
    Input,
    /// Checkbox, radio, file and other change events
    Change,
    /// Option picked from a `<select>`
    Select,
    /// Special key press (Enter, Tab, Escape)
    Keydown,
}

impl ActionType {
    /// Lower-case wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Navigate => "navigate",
            Self::Click => "click",
            Self::Input => "input",
            Self::Change => "change",
            Self::Select => "select",
            Self::Keydown => "keydown",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One captured interaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    /// Interaction kind
    #[serde(rename = "type")]
    pub action_type: ActionType,
    /// How `selector` is interpreted
    pub locator_kind: LocatorKind,
    /// Locator text
    pub selector: String,
    /// Typed text, selected option, or key name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Target URL of a navigate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Unix epoch milliseconds
    pub timestamp: i64,
}

impl ActionRecord {
    /// Record for an interaction with the element `locator` designates
    #[must_use]
    pub fn new(action_type: ActionType, locator: Locator) -> Self {
        Self {
            action_type,
            locator_kind: locator.kind,
            selector: locator.selector,
            value: None,
            url: None,
            timestamp: now_millis(),
        }
    }

    /// Navigate record
    #[must_use]
    pub fn navigate(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::new(ActionType::Navigate, Locator::xpath(NAVIGATE_SELECTOR))
        }
    }

    /// Click record
    #[must_use]
    pub fn click(locator: Locator) -> Self {
        Self::new(ActionType::Click, locator)
    }

    /// Input record
    #[must_use]
    pub fn input(locator: Locator, text: impl Into<String>) -> Self {
        Self::new(ActionType::Input, locator).with_value(text)
    }

    /// Set the value
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set the timestamp
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// The record's locator
    #[must_use]
    pub fn locator(&self) -> Locator {
        Locator::new(self.locator_kind, self.selector.clone())
    }

    /// Whether this is a navigate record
    #[must_use]
    pub fn is_navigate(&self) -> bool {
        self.action_type == ActionType::Navigate
    }

    /// Reject records the script targets cannot express.
    ///
    /// A `keydown` must carry one of [`SPECIAL_KEYS`]; a `navigate` must
    /// carry a URL.
    pub fn validate(&self) -> GrabarResult<()> {
        match self.action_type {
            ActionType::Keydown => match self.value.as_deref() {
                Some(key) if SPECIAL_KEYS.contains(&key) => Ok(()),
                Some(key) => Err(GrabarError::invalid_action(format!(
                    "unsupported key '{key}' (expected one of {})",
                    SPECIAL_KEYS.join(", ")
                ))),
                None => Err(GrabarError::invalid_action("keydown without a key")),
            },
            ActionType::Navigate if self.url.is_none() => {
                Err(GrabarError::invalid_action("navigate without a url"))
            }
            _ => Ok(()),
        }
    }
}

/// Current time in Unix epoch milliseconds
#[must_use]
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_shape() {
        let record = ActionRecord::input(Locator::id("name"), "hello").with_timestamp(1_700_000_000_000);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "input",
                "locatorKind": "ID",
                "selector": "#name",
                "value": "hello",
                "timestamp": 1_700_000_000_000_i64,
            })
        );
    }

    #[test]
    fn test_navigate_shape() {
        let record = ActionRecord::navigate("https://example.com/").with_timestamp(5);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "navigate");
        assert_eq!(json["locatorKind"], "XPATH");
        assert_eq!(json["selector"], "/html");
        assert_eq!(json["url"], "https://example.com/");
        assert!(json.get("value").is_none());
    }

    #[test]
    fn test_deserialize_without_optional_fields() {
        let record: ActionRecord = serde_json::from_str(
            r#"{"type":"click","locatorKind":"CSS","selector":".go","timestamp":1}"#,
        )
        .unwrap();
        assert_eq!(record.action_type, ActionType::Click);
        assert_eq!(record.locator(), Locator::css(".go"));
        assert_eq!(record.value, None);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result: Result<ActionRecord, _> = serde_json::from_str(
            r#"{"type":"hover","locatorKind":"CSS","selector":".go","timestamp":1}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_special_keydown_is_valid() {
        for key in SPECIAL_KEYS {
            let record = ActionRecord::new(ActionType::Keydown, Locator::id("q")).with_value(*key);
            assert!(record.validate().is_ok());
        }
        assert!(ActionRecord::click(Locator::id("go")).validate().is_ok());
        assert!(ActionRecord::navigate("https://example.com").validate().is_ok());
    }

    #[test]
    fn test_unexpressible_records_rejected() {
        let arrow = ActionRecord::new(ActionType::Keydown, Locator::id("q")).with_value("ArrowDown");
        let err = arrow.validate().unwrap_err();
        assert!(matches!(err, GrabarError::InvalidAction { .. }));
        assert!(err.to_string().contains("ArrowDown"));

        let bare = ActionRecord::new(ActionType::Keydown, Locator::id("q"));
        assert!(matches!(bare.validate(), Err(GrabarError::InvalidAction { .. })));

        let mut navigate = ActionRecord::navigate("https://example.com");
        navigate.url = None;
        assert!(navigate.validate().is_err());
    }

    #[test]
    fn test_new_stamps_current_time() {
        let before = now_millis();
        let record = ActionRecord::click(Locator::id("go"));
        assert!(record.timestamp >= before);
        assert!(!record.is_navigate());
    }
}
