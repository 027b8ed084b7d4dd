//! Record command handler
//!
//! Replays a captured event log against an HTML snapshot. Each event names
//! its target with a CSS query, or an XPath when the query starts with `/`:
//!
//! ```json
//! [
//!   {"type": "load", "url": "https://app.example/signup"},
//!   {"type": "click", "target": "#submit"},
//!   {"type": "input", "target": "#name", "value": "hello"},
//!   {"type": "keydown", "target": "#name", "key": "Enter"}
//! ]
//! ```

use serde::{Deserialize, Serialize};

use super::locate::find_target;
use super::{read_json, write_output};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::RecordArgs;
use grabar::{ActionRecord, Document, DomEvent, DomEventKind, GrabarConfig, Recorder};

/// One entry of a captured event log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedEvent {
    /// Event type
    #[serde(rename = "type")]
    pub kind: DomEventKind,
    /// Element query, absent for `load`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Target value after the event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Key name for `keydown`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Page URL for `load`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Unix epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl CapturedEvent {
    /// Resolve the target query and build the recorder event
    pub fn to_dom_event(&self, doc: &Document) -> CliResult<DomEvent> {
        let target = match (self.kind, self.target.as_deref()) {
            (DomEventKind::Load, _) => None,
            (_, Some(query)) => Some(find_target(doc, query)?),
            (kind, None) => {
                return Err(CliError::invalid_argument(format!(
                    "{kind:?} event without a target"
                )))
            }
        };
        Ok(DomEvent {
            kind: self.kind,
            target,
            value: self.value.clone(),
            key: self.key.clone(),
            url: self.url.clone(),
            timestamp: self.timestamp,
        })
    }
}

/// Run `events` through a recorder session over `doc`
pub fn replay(
    doc: &Document,
    events: &[CapturedEvent],
    start_url: Option<&str>,
    settings: &GrabarConfig,
) -> CliResult<Vec<ActionRecord>> {
    let mut recorder = Recorder::new(settings.locator.clone());
    recorder.start(start_url)?;
    for (index, captured) in events.iter().enumerate() {
        let event = captured.to_dom_event(doc).map_err(|err| {
            CliError::invalid_argument(format!("event {index}: {err}"))
        })?;
        recorder.handle(doc, &event)?;
    }
    Ok(recorder.stop()?)
}

/// Execute the record command
pub fn execute_record(config: &CliConfig, settings: &GrabarConfig, args: &RecordArgs) -> CliResult<()> {
    let html = std::fs::read_to_string(&args.html)?;
    let doc = Document::parse(&html)?;
    let events: Vec<CapturedEvent> = read_json(&args.events)?;

    let actions = replay(&doc, &events, args.url.as_deref(), settings)?;
    let json = serde_json::to_string_pretty(&actions).map_err(grabar::GrabarError::from)?;
    write_output(args.output.as_deref(), &json)?;

    if let Some(path) = &args.output {
        config.reporter().success(&format!(
            "Recorded {} actions from {} events to {}",
            actions.len(),
            events.len(),
            path.display()
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use grabar::{ActionType, GrabarError, Locator};
    use tempfile::TempDir;

    const PAGE: &str = r#"<html><body>
        <input id="name"><select name="plan"><option value="pro">Pro</option></select>
        <button id="submit">Create</button>
    </body></html>"#;

    fn events(json: &str) -> Vec<CapturedEvent> {
        serde_json::from_str(json).unwrap()
    }

    mod replay_tests {
        use super::*;

        #[test]
        fn test_click_then_input() {
            let doc = Document::parse(PAGE).unwrap();
            let log = events(
                r##"[{"type":"click","target":"#submit"},{"type":"input","target":"#name","value":"hello"}]"##,
            );
            let actions =
                replay(&doc, &log, Some("https://app.example"), &GrabarConfig::default()).unwrap();
            assert_eq!(actions.len(), 3);
            assert!(actions[0].is_navigate());
            assert_eq!(actions[1].locator(), Locator::id("submit"));
            assert_eq!(actions[2].value.as_deref(), Some("hello"));
        }

        #[test]
        fn test_duplicate_load_suppressed() {
            let doc = Document::parse(PAGE).unwrap();
            let log = events(
                r#"[{"type":"load","url":"https://app.example"},{"type":"change","target":"select","value":"pro"}]"#,
            );
            let actions =
                replay(&doc, &log, Some("https://app.example"), &GrabarConfig::default()).unwrap();
            assert_eq!(actions.len(), 2);
            assert_eq!(actions[1].action_type, ActionType::Select);
        }

        #[test]
        fn test_xpath_target() {
            let doc = Document::parse(PAGE).unwrap();
            let log = events(r#"[{"type":"click","target":"/html[1]/body[1]/button[1]"}]"#);
            let actions = replay(&doc, &log, None, &GrabarConfig::default()).unwrap();
            assert_eq!(actions.len(), 1);
            assert_eq!(actions[0].selector, "#submit");
        }

        #[test]
        fn test_missing_target_names_event() {
            let doc = Document::parse(PAGE).unwrap();
            let log = events(r#"[{"type":"load","url":"https://a"},{"type":"click"}]"#);
            let err = replay(&doc, &log, None, &GrabarConfig::default()).unwrap_err();
            assert!(err.to_string().contains("event 1"));
        }

        #[test]
        fn test_unmatched_target_fails() {
            let doc = Document::parse(PAGE).unwrap();
            let log = events(r##"[{"type":"click","target":"#gone"}]"##);
            let err = replay(&doc, &log, None, &GrabarConfig::default()).unwrap_err();
            assert!(matches!(err, CliError::InvalidArgument { .. }));
        }

        #[test]
        fn test_ordinary_key_ignored() {
            let doc = Document::parse(PAGE).unwrap();
            let log = events(r##"[{"type":"keydown","target":"#name","key":"a"}]"##);
            assert!(replay(&doc, &log, None, &GrabarConfig::default()).unwrap().is_empty());
        }
    }

    mod execute_tests {
        use super::*;

        #[test]
        fn test_writes_action_file() {
            let dir = TempDir::new().unwrap();
            let html = dir.path().join("page.html");
            let log = dir.path().join("events.json");
            let out = dir.path().join("actions.json");
            std::fs::write(&html, PAGE).unwrap();
            std::fs::write(&log, r##"[{"type":"click","target":"#submit"}]"##).unwrap();

            let args = RecordArgs {
                html,
                events: log,
                url: None,
                output: Some(out.clone()),
            };
            let config = CliConfig::new().with_verbosity(crate::Verbosity::Quiet);
            execute_record(&config, &GrabarConfig::default(), &args).unwrap();

            let written: Vec<ActionRecord> =
                serde_json::from_str(&std::fs::read_to_string(out).unwrap()).unwrap();
            assert_eq!(written.len(), 1);
            assert_eq!(written[0].selector, "#submit");
        }

        #[test]
        fn test_bad_html_is_library_error() {
            let dir = TempDir::new().unwrap();
            let html = dir.path().join("page.html");
            let log = dir.path().join("events.json");
            std::fs::write(&html, "<body><!-- never closed").unwrap();
            std::fs::write(&log, "[]").unwrap();
            let args = RecordArgs {
                html,
                events: log,
                url: None,
                output: None,
            };
            let err = execute_record(&CliConfig::new(), &GrabarConfig::default(), &args).unwrap_err();
            assert!(matches!(err, CliError::Grabar(GrabarError::HtmlParse { .. })));
        }
    }
}
