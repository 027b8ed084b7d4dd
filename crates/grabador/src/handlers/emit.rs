//! Emit command handler

use super::{read_json, write_output};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::EmitArgs;
use grabar::script::write_with_manifest;
use grabar::{ActionRecord, EmitOptions, GrabarConfig, ScriptEmitter};

/// Configured emit defaults with command-line overrides applied
#[must_use]
pub fn emit_options(defaults: &EmitOptions, args: &EmitArgs) -> EmitOptions {
    let mut options = defaults.clone();
    if let Some(target) = args.target {
        options = options.with_target(target.into());
    }
    if let Some(browser) = args.browser {
        options = options.with_browser(browser.into());
    }
    if let Some(wait) = args.wait {
        options = options.with_explicit_wait(wait);
    }
    if let Some(delay) = args.delay_ms {
        options = options.with_action_delay_ms(delay);
    }
    if let Some(url) = &args.base_url {
        options = options.with_base_url(url.clone());
    }
    if args.no_header {
        options = options.with_header(false);
    }
    options
}

/// Execute the emit command
pub fn execute_emit(config: &CliConfig, settings: &GrabarConfig, args: &EmitArgs) -> CliResult<()> {
    let actions: Vec<ActionRecord> = read_json(&args.actions)?;
    for (index, action) in actions.iter().enumerate() {
        action
            .validate()
            .map_err(|err| CliError::input(&args.actions, format!("action {index}: {err}")))?;
    }
    let options = emit_options(&settings.emit, args);
    let script = ScriptEmitter::new(options).emit(&actions)?;

    let reporter = config.reporter();
    match &args.output {
        Some(path) if args.manifest => {
            let manifest = write_with_manifest(path, &script)?;
            reporter.success(&format!(
                "Wrote {} ({} steps), manifest {}",
                path.display(),
                script.block_count,
                manifest.display()
            ));
        }
        Some(path) => {
            write_output(Some(path), &script.text)?;
            reporter.success(&format!("Wrote {} ({} steps)", path.display(), script.block_count));
        }
        None => write_output(None, &script.text)?,
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::{BrowserArg, TargetArg, Verbosity};
    use grabar::{Browser, Locator, ScriptLanguage};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn args(actions: PathBuf) -> EmitArgs {
        EmitArgs {
            actions,
            target: None,
            browser: None,
            wait: None,
            delay_ms: None,
            base_url: None,
            no_header: false,
            output: None,
            manifest: false,
        }
    }

    mod option_tests {
        use super::*;

        #[test]
        fn test_no_flags_keeps_config() {
            let defaults = EmitOptions::default().with_action_delay_ms(42);
            let options = emit_options(&defaults, &args(PathBuf::from("a.json")));
            assert_eq!(options, defaults);
        }

        #[test]
        fn test_flags_override() {
            let mut a = args(PathBuf::from("a.json"));
            a.target = Some(TargetArg::Javascript);
            a.browser = Some(BrowserArg::Firefox);
            a.wait = Some(false);
            a.delay_ms = Some(0);
            a.no_header = true;
            let options = emit_options(&EmitOptions::default(), &a);
            assert_eq!(options.target, ScriptLanguage::JavaScript);
            assert_eq!(options.browser, Browser::Firefox);
            assert!(!options.explicit_wait);
            assert_eq!(options.action_delay_ms, 0);
            assert!(!options.header);
        }
    }

    mod execute_tests {
        use super::*;

        fn write_actions(dir: &TempDir) -> PathBuf {
            let path = dir.path().join("actions.json");
            let actions = vec![
                ActionRecord::navigate("https://app.example"),
                ActionRecord::click(Locator::id("submit")),
            ];
            std::fs::write(&path, serde_json::to_string(&actions).unwrap()).unwrap();
            path
        }

        #[test]
        fn test_writes_script_and_manifest() {
            let dir = TempDir::new().unwrap();
            let out = dir.path().join("signup.py");
            let mut a = args(write_actions(&dir));
            a.output = Some(out.clone());
            a.manifest = true;

            let config = CliConfig::new().with_verbosity(Verbosity::Quiet);
            execute_emit(&config, &GrabarConfig::default(), &a).unwrap();

            let text = std::fs::read_to_string(&out).unwrap();
            assert!(text.contains("driver.get(\"https://app.example\")"));
            assert!(dir.path().join("signup.py.manifest.json").exists());
            grabar::script::verify(&out).unwrap();
        }

        #[test]
        fn test_unsupported_key_names_the_action() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("actions.json");
            std::fs::write(
                &path,
                r##"[{"type":"click","locatorKind":"ID","selector":"#go","timestamp":1},
                    {"type":"keydown","locatorKind":"ID","selector":"#q","value":"ArrowDown","timestamp":2}]"##,
            )
            .unwrap();

            let err = execute_emit(&CliConfig::new(), &GrabarConfig::default(), &args(path)).unwrap_err();
            assert!(matches!(err, CliError::Input { .. }));
            assert!(err.to_string().contains("action 1"));
            assert!(err.to_string().contains("ArrowDown"));
        }

        #[test]
        fn test_plain_output_has_no_manifest() {
            let dir = TempDir::new().unwrap();
            let out = dir.path().join("signup.js");
            let mut a = args(write_actions(&dir));
            a.output = Some(out.clone());
            a.target = Some(TargetArg::Javascript);

            let config = CliConfig::new().with_verbosity(Verbosity::Quiet);
            execute_emit(&config, &GrabarConfig::default(), &a).unwrap();

            assert!(std::fs::read_to_string(&out).unwrap().contains("selenium-webdriver"));
            assert!(!dir.path().join("signup.js.manifest.json").exists());
        }
    }
}
