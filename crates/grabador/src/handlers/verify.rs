//! Verify command handler

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::VerifyArgs;

/// Execute the verify command
pub fn execute_verify(config: &CliConfig, args: &VerifyArgs) -> CliResult<()> {
    let reporter = config.reporter();
    match grabar::script::verify(&args.script) {
        Ok(manifest) => {
            reporter.success(&format!(
                "{} matches its manifest ({} {} steps, generated {})",
                args.script.display(),
                manifest.block_count,
                manifest.generation.target,
                manifest.generation.timestamp
            ));
            Ok(())
        }
        Err(err) => {
            reporter.failure(&err.to_string());
            Err(err.into())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::{CliError, Verbosity};
    use grabar::script::write_with_manifest;
    use grabar::{ActionRecord, GrabarError, Locator, ScriptEmitter};
    use tempfile::TempDir;

    fn quiet() -> CliConfig {
        CliConfig::new().with_verbosity(Verbosity::Quiet)
    }

    #[test]
    fn test_untouched_script_passes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.py");
        let script = ScriptEmitter::default()
            .emit(&[ActionRecord::click(Locator::id("go"))])
            .unwrap();
        write_with_manifest(&path, &script).unwrap();
        execute_verify(&quiet(), &VerifyArgs { script: path }).unwrap();
    }

    #[test]
    fn test_edited_script_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.py");
        let script = ScriptEmitter::default().emit(&[]).unwrap();
        write_with_manifest(&path, &script).unwrap();
        std::fs::write(&path, "print('edited')\n").unwrap();

        let err = execute_verify(&quiet(), &VerifyArgs { script: path }).unwrap_err();
        assert!(matches!(err, CliError::Grabar(GrabarError::HashMismatch { .. })));
    }

    #[test]
    fn test_missing_manifest_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.py");
        std::fs::write(&path, "pass\n").unwrap();
        let err = execute_verify(&quiet(), &VerifyArgs { script: path }).unwrap_err();
        assert!(matches!(err, CliError::Grabar(GrabarError::Manifest { .. })));
    }
}
