//! Config command handler

use std::path::Path;

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::ConfigCommand;
use grabar::GrabarConfig;

/// Effective configuration as YAML, token masked
pub fn render_config(settings: &GrabarConfig) -> CliResult<String> {
    let mut shown = settings.clone();
    if shown.api.token.is_some() {
        shown.api.token = Some("********".to_string());
    }
    Ok(shown.to_yaml()?)
}

/// Write the default configuration to `path`
pub fn init_config(path: &Path, force: bool) -> CliResult<()> {
    if path.exists() && !force {
        return Err(CliError::config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    GrabarConfig::default().save(path)?;
    Ok(())
}

/// Execute a config subcommand
pub fn execute_config(
    config: &CliConfig,
    settings: &GrabarConfig,
    config_path: &Path,
    command: &ConfigCommand,
) -> CliResult<()> {
    match command {
        ConfigCommand::Show => {
            let reporter = config.reporter();
            if config_path.exists() {
                reporter.info(&format!("Loaded {}", config_path.display()));
            } else {
                reporter.info(&format!("{} not found, showing defaults", config_path.display()));
            }
            print!("{}", render_config(settings)?);
        }
        ConfigCommand::Init { force } => {
            init_config(config_path, *force)?;
            config
                .reporter()
                .success(&format!("Wrote {}", config_path.display()));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render_masks_token() {
        let mut settings = GrabarConfig::default();
        settings.api.token = Some("secret-token".to_string());
        let yaml = render_config(&settings).unwrap();
        assert!(!yaml.contains("secret-token"));
        assert!(yaml.contains("test_attributes"));
    }

    #[test]
    fn test_init_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("grabar.yaml");
        init_config(&path, false).unwrap();
        assert_eq!(GrabarConfig::load(&path).unwrap(), GrabarConfig::default());
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("grabar.yaml");
        std::fs::write(&path, "emit:\n  target: javascript\n").unwrap();

        let err = init_config(&path, false).unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
        assert!(std::fs::read_to_string(&path).unwrap().contains("javascript"));

        init_config(&path, true).unwrap();
        assert_eq!(GrabarConfig::load(&path).unwrap(), GrabarConfig::default());
    }
}
