//! Message protocol between the page recorder and the recording host.
//!
//! Requests are `{ "action": <name>, "payload": <json?> }`; responses are
//! `{ "success": bool, "error"?: string, ...data }` with data keys flattened
//! into the top level.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::action::ActionRecord;
use crate::result::{GrabarError, GrabarResult};
use crate::script::EmitOptions;
use crate::session::SessionState;

/// A host request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Begin recording, optionally on a page
    StartRecording {
        /// Page the recording starts on
        url: Option<String>,
    },
    /// Stop and return the sequence
    StopRecording,
    /// Append one record
    RecordAction(ActionRecord),
    /// Current sequence
    GetRecordedActions,
    /// Drop the sequence
    ClearRecordedActions,
    /// Emit a script from the current sequence; `None` uses host defaults
    GenerateScript(Option<EmitOptions>),
}

#[derive(Deserialize)]
struct Envelope {
    action: String,
    #[serde(default)]
    payload: Value,
}

#[derive(Deserialize)]
struct StartPayload {
    #[serde(default)]
    url: Option<String>,
}

impl Request {
    /// Wire name of the action
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::StartRecording { .. } => "startRecording",
            Self::StopRecording => "stopRecording",
            Self::RecordAction(_) => "recordAction",
            Self::GetRecordedActions => "getRecordedActions",
            Self::ClearRecordedActions => "clearRecordedActions",
            Self::GenerateScript(_) => "generateScript",
        }
    }

    /// Parse a JSON request
    pub fn parse(json: &str) -> GrabarResult<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|err| GrabarError::protocol(format!("malformed message: {err}")))?;
        Self::from_value(value)
    }

    /// Interpret an already-decoded JSON value
    pub fn from_value(value: Value) -> GrabarResult<Self> {
        let envelope: Envelope = serde_json::from_value(value)
            .map_err(|err| GrabarError::protocol(format!("malformed message: {err}")))?;
        let payload = envelope.payload;

        let request = match envelope.action.as_str() {
            "startRecording" => {
                let start: StartPayload = if payload.is_null() {
                    StartPayload { url: None }
                } else {
                    decode_payload(&envelope.action, payload)?
                };
                Self::StartRecording { url: start.url }
            }
            "stopRecording" => Self::StopRecording,
            "recordAction" => Self::RecordAction(decode_payload(&envelope.action, payload)?),
            "getRecordedActions" => Self::GetRecordedActions,
            "clearRecordedActions" => Self::ClearRecordedActions,
            "generateScript" if payload.is_null() => Self::GenerateScript(None),
            "generateScript" => {
                Self::GenerateScript(Some(decode_payload(&envelope.action, payload)?))
            }
            other => return Err(GrabarError::protocol(format!("unknown action '{other}'"))),
        };
        Ok(request)
    }

    /// Encode as a JSON value
    pub fn to_value(&self) -> GrabarResult<Value> {
        let payload = match self {
            Self::StartRecording { url } => serde_json::json!({ "url": url }),
            Self::RecordAction(record) => serde_json::to_value(record)?,
            Self::GenerateScript(Some(options)) => serde_json::to_value(options)?,
            Self::StopRecording
            | Self::GetRecordedActions
            | Self::ClearRecordedActions
            | Self::GenerateScript(None) => Value::Null,
        };
        Ok(serde_json::json!({ "action": self.action(), "payload": payload }))
    }
}

fn decode_payload<T: serde::de::DeserializeOwned>(action: &str, payload: Value) -> GrabarResult<T> {
    serde_json::from_value(payload)
        .map_err(|err| GrabarError::protocol(format!("invalid {action} payload: {err}")))
}

/// Data carried by a response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    /// Action sequence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<ActionRecord>>,
    /// Sequence length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// Whether a `recordAction` was appended
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded: Option<bool>,
    /// Session id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    /// Session state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<SessionState>,
    /// Generated script text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
}

/// A host response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Whether the request succeeded
    pub success: bool,
    /// Failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Payload
    #[serde(flatten)]
    pub data: ResponseData,
}

impl Response {
    /// Successful response without data
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: ResponseData::default(),
        }
    }

    /// Failed response
    #[must_use]
    pub fn failure(error: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            data: ResponseData::default(),
        }
    }

    /// Attach a sequence and its length
    #[must_use]
    pub fn with_actions(mut self, actions: Vec<ActionRecord>) -> Self {
        self.data.count = Some(actions.len());
        self.data.actions = Some(actions);
        self
    }

    /// Attach a count
    #[must_use]
    pub const fn with_count(mut self, count: usize) -> Self {
        self.data.count = Some(count);
        self
    }

    /// Attach the append flag
    #[must_use]
    pub const fn with_recorded(mut self, recorded: bool) -> Self {
        self.data.recorded = Some(recorded);
        self
    }

    /// Attach the session id and state
    #[must_use]
    pub const fn with_session(mut self, id: Uuid, state: SessionState) -> Self {
        self.data.session_id = Some(id);
        self.data.state = Some(state);
        self
    }

    /// Attach script text
    #[must_use]
    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.data.script = Some(script.into());
        self
    }
}
