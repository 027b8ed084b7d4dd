//! Grabar: record page interactions and turn them into Selenium scripts
//!
//! Grabar (Spanish: "to record") captures what a user does on a page,
//! derives a stable locator for every element touched, and expands the
//! recorded sequence into a runnable Selenium script.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌───────────┐   ┌──────────┐
//! │ DomEvent │──►│ Locator  │──►│ Action   │──►│ Recording │──►│ Script   │
//! │ +snapshot│   │ synthesis│   │ record   │   │ session   │   │ emitter  │
//! └──────────┘   └──────────┘   └──────────┘   └───────────┘   └──────────┘
//!                                                    ▲
//!                         native messaging ──► RecordingHost
//! ```
//!
//! # Example
//!
//! ```
//! use grabar::{Document, DomEvent, EmitOptions, Recorder, ScriptEmitter};
//!
//! let doc = Document::parse(r#"<button id="submit">Go</button>"#)?;
//! let button = doc.get_element_by_id("submit").unwrap_or(doc.root());
//!
//! let mut recorder = Recorder::default();
//! recorder.start(Some("https://example.com"))?;
//! recorder.handle(&doc, &DomEvent::click(button))?;
//! let actions = recorder.stop()?;
//!
//! let script = ScriptEmitter::new(EmitOptions::default()).emit(&actions)?;
//! assert_eq!(script.block_count, 1);
//! # Ok::<(), grabar::GrabarError>(())
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod action;
/// Backend client for projects and saved scripts
#[cfg(feature = "client")]
pub mod client;
mod config;
/// Arena DOM snapshots, HTML parsing, selectors and structural paths
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod dom;
mod event;
mod host;
mod locator;
mod protocol;
mod recorder;
mod result;
/// Script emission targets and manifests
pub mod script;
mod session;

pub use action::{now_millis, ActionRecord, ActionType, NAVIGATE_SELECTOR};
#[cfg(feature = "client")]
pub use client::{ApiClient, NewProject, NewScript, Project, ProjectPatch, SavedScript};
pub use config::{ApiConfig, GrabarConfig, DEFAULT_CONFIG_FILE};
pub use dom::{parse_html, Document, Element, NodeData, NodeId};
pub use event::{DomEvent, DomEventKind, SPECIAL_KEYS};
pub use host::{
    read_message, write_message, RecordingHost, MAX_INCOMING_MESSAGE, MAX_OUTGOING_MESSAGE,
};
pub use locator::{
    synthesize, Locator, LocatorConfig, LocatorKind, LocatorSynthesizer,
    DEFAULT_TEST_ATTRIBUTES,
};
pub use protocol::{Request, Response, ResponseData};
pub use recorder::Recorder;
pub use result::{GrabarError, GrabarResult};
pub use script::{
    Browser, EmitOptions, FileManifest, GenerationMetadata, Script, ScriptEmitter,
    ScriptLanguage, ScriptTarget,
};
pub use session::{RecordingSession, SessionState};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::action::*;
    pub use super::dom::{Document, NodeId};
    pub use super::event::*;
    pub use super::locator::*;
    pub use super::recorder::*;
    pub use super::result::*;
    pub use super::script::{EmitOptions, Script, ScriptEmitter, ScriptLanguage};
    pub use super::session::*;
}
