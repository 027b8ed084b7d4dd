//! Selenium script emission.
//!
//! The emitter makes a single forward pass over the action sequence:
//!
//! ```text
//! header?   comment lines: tool, version, counts, input hash
//! preamble  imports, driver construction, get(<first navigate URL>)
//! blocks    one per non-navigate action: find, wait?, act, delay
//! teardown  driver.quit()
//! ```
//!
//! A navigate that is not the first record only leaves a comment line.
//! Each target language implements [`ScriptTarget`].

mod javascript;
pub mod manifest;
mod python;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::action::{ActionRecord, ActionType};
use crate::result::{GrabarError, GrabarResult};

pub use javascript::JavaScriptTarget;
pub use manifest::{hash_contents, verify, write_with_manifest, FileManifest};
pub use python::PythonTarget;

/// Tool name written into headers and manifests
pub const TOOL_NAME: &str = "grabar";

/// Script language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptLanguage {
    /// Python `selenium` bindings
    #[default]
    Python,
    /// Node `selenium-webdriver`
    JavaScript,
}

impl ScriptLanguage {
    /// Lower-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
        }
    }

    /// File extension for generated scripts
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Python => "py",
            Self::JavaScript => "js",
        }
    }
}

impl fmt::Display for ScriptLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScriptLanguage {
    type Err = GrabarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Self::Python),
            "javascript" | "js" | "node" => Ok(Self::JavaScript),
            other => Err(GrabarError::config(format!("unknown script target '{other}'"))),
        }
    }
}

/// Browser the generated script drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    /// Google Chrome
    #[default]
    Chrome,
    /// Mozilla Firefox
    Firefox,
    /// Microsoft Edge
    Edge,
}

impl Browser {
    /// Lower-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
            Self::Edge => "edge",
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Browser {
    type Err = GrabarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chrome" | "chromium" => Ok(Self::Chrome),
            "firefox" => Ok(Self::Firefox),
            "edge" | "msedge" => Ok(Self::Edge),
            other => Err(GrabarError::config(format!("unknown browser '{other}'"))),
        }
    }
}

/// Emission options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitOptions {
    /// Output language
    pub target: ScriptLanguage,
    /// Wait for each element before acting on it
    pub explicit_wait: bool,
    /// Explicit wait timeout
    pub wait_timeout_secs: u64,
    /// Pause after every action; 0 disables
    pub action_delay_ms: u64,
    /// Browser to launch
    pub browser: Browser,
    /// Prepend a comment header with generation metadata
    pub header: bool,
    /// Opened when the sequence does not start with a navigate
    pub base_url: Option<String>,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            target: ScriptLanguage::Python,
            explicit_wait: true,
            wait_timeout_secs: 10,
            action_delay_ms: 500,
            browser: Browser::Chrome,
            header: true,
            base_url: None,
        }
    }
}

impl EmitOptions {
    /// Set the language
    #[must_use]
    pub const fn with_target(mut self, target: ScriptLanguage) -> Self {
        self.target = target;
        self
    }

    /// Enable or disable explicit waits
    #[must_use]
    pub const fn with_explicit_wait(mut self, enabled: bool) -> Self {
        self.explicit_wait = enabled;
        self
    }

    /// Set the per-action delay
    #[must_use]
    pub const fn with_action_delay_ms(mut self, delay_ms: u64) -> Self {
        self.action_delay_ms = delay_ms;
        self
    }

    /// Set the browser
    #[must_use]
    pub const fn with_browser(mut self, browser: Browser) -> Self {
        self.browser = browser;
        self
    }

    /// Enable or disable the header
    #[must_use]
    pub const fn with_header(mut self, enabled: bool) -> Self {
        self.header = enabled;
        self
    }

    /// Set the fallback start URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
}

/// Where and from what a script was generated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Generating tool
    pub tool: String,
    /// Tool version
    pub version: String,
    /// Output language
    pub target: ScriptLanguage,
    /// Records in the input sequence
    pub action_count: usize,
    /// Blake3 hash of the JSON-encoded input sequence
    pub input_hash: String,
    /// RFC 3339 timestamp
    pub timestamp: String,
}

impl GenerationMetadata {
    /// Metadata for a sequence emitted now
    pub fn for_actions(actions: &[ActionRecord], target: ScriptLanguage) -> GrabarResult<Self> {
        let encoded = serde_json::to_vec(actions)?;
        Ok(Self {
            tool: TOOL_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            target,
            action_count: actions.len(),
            input_hash: blake3::hash(&encoded).to_hex().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        })
    }
}

/// An emitted script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    /// Script source
    pub text: String,
    /// Action blocks emitted
    pub block_count: usize,
    /// Language of `text`
    pub language: ScriptLanguage,
    /// Generation metadata
    pub metadata: GenerationMetadata,
}

/// A language the emitter can write.
///
/// Implementations return text with their own indentation; the emitter only
/// concatenates.
pub trait ScriptTarget {
    /// Language produced
    fn language(&self) -> ScriptLanguage;

    /// One comment line at body indentation, without trailing newline
    fn comment(&self, text: &str) -> String;

    /// Imports, driver construction and the initial `get`
    fn preamble(&self, options: &EmitOptions, start_url: Option<&str>) -> String;

    /// Block for one non-navigate action
    fn action_block(
        &self,
        step: usize,
        action: &ActionRecord,
        options: &EmitOptions,
    ) -> GrabarResult<String>;

    /// Closing lines
    fn teardown(&self, options: &EmitOptions) -> String;
}

/// Target implementation for a language
#[must_use]
pub fn target_for(language: ScriptLanguage) -> Box<dyn ScriptTarget> {
    match language {
        ScriptLanguage::Python => Box::new(PythonTarget),
        ScriptLanguage::JavaScript => Box::new(JavaScriptTarget),
    }
}

/// Turns action sequences into scripts
#[derive(Debug, Clone, Default)]
pub struct ScriptEmitter {
    options: EmitOptions,
}

impl ScriptEmitter {
    /// Emitter with the given options
    #[must_use]
    pub const fn new(options: EmitOptions) -> Self {
        Self { options }
    }

    /// Active options
    #[must_use]
    pub const fn options(&self) -> &EmitOptions {
        &self.options
    }

    /// Emit a script for the sequence
    pub fn emit(&self, actions: &[ActionRecord]) -> GrabarResult<Script> {
        let target = target_for(self.options.target);
        self.emit_with(target.as_ref(), actions)
    }

    /// Emit with an explicit target implementation
    pub fn emit_with(
        &self,
        target: &dyn ScriptTarget,
        actions: &[ActionRecord],
    ) -> GrabarResult<Script> {
        let metadata = GenerationMetadata::for_actions(actions, target.language())?;

        let (start_url, rest) = match actions.split_first() {
            Some((first, rest)) if first.is_navigate() => (first.url.as_deref(), rest),
            _ => (None, actions),
        };
        let start_url = start_url.or(self.options.base_url.as_deref());

        let mut out = String::new();
        if self.options.header {
            out.push_str(&header(target, &metadata));
            out.push('\n');
        }
        out.push_str(&target.preamble(&self.options, start_url));

        let mut block_count = 0;
        for action in rest {
            if action.action_type == ActionType::Navigate {
                let url = action.url.as_deref().unwrap_or_default();
                out.push('\n');
                out.push_str(&target.comment(&format!("navigated to {url}")));
                out.push('\n');
                continue;
            }
            block_count += 1;
            out.push('\n');
            out.push_str(&target.action_block(block_count, action, &self.options)?);
        }

        out.push_str(&target.teardown(&self.options));
        tracing::debug!(
            target = %target.language(),
            blocks = block_count,
            "script emitted"
        );

        Ok(Script {
            text: out,
            block_count,
            language: target.language(),
            metadata,
        })
    }
}

fn header(target: &dyn ScriptTarget, metadata: &GenerationMetadata) -> String {
    let lines = [
        format!("Generated by {} {}", metadata.tool, metadata.version),
        format!("Recorded actions: {}", metadata.action_count),
        format!("Generated at: {}", metadata.timestamp),
        format!("Input hash: {}", metadata.input_hash),
    ];
    lines
        .iter()
        .map(|line| format!("{}\n", target.comment(line).trim_start()))
        .collect()
}

/// Double-quoted string literal valid in both Python and JavaScript
#[must_use]
pub fn quote_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' | '\u{2029}' => out.push_str(&format!("\\u{:04x}", c as u32)),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Text made safe for a single-line comment
#[must_use]
pub fn comment_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Seconds as a decimal literal (`500` -> `0.5`)
#[must_use]
pub fn millis_as_seconds(ms: u64) -> String {
    let (secs, frac) = (ms / 1000, ms % 1000);
    if frac == 0 {
        return secs.to_string();
    }
    let frac = format!("{frac:03}");
    format!("{secs}.{}", frac.trim_end_matches('0'))
}

/// Selenium key constant for a recorded special key (`Enter` -> `ENTER`)
#[must_use]
pub fn key_constant(key: &str) -> Option<&'static str> {
    match key {
        "Enter" => Some("ENTER"),
        "Tab" => Some("TAB"),
        "Escape" => Some("ESCAPE"),
        _ => None,
    }
}

pub(crate) fn unsupported_action(action: &ActionRecord) -> GrabarError {
    GrabarError::generation(format!("no template for {} records", action.action_type))
}

/// Short description of an action for step comments
#[must_use]
pub fn describe(action: &ActionRecord) -> String {
    let base = format!("{} {}", action.action_type, action.locator());
    match (&action.action_type, action.value.as_deref()) {
        (ActionType::Click, _) | (_, None) => comment_text(&base),
        (_, Some(value)) => comment_text(&format!("{base} = {value}")),
    }
}
