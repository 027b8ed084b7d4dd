//! Login command handler

use std::path::Path;

use super::run_remote;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::LoginArgs;
use grabar::{ApiClient, GrabarConfig};

/// Store `token` in the configuration file at `path`, keeping other settings
pub fn save_token(path: &Path, token: &str) -> CliResult<()> {
    let mut stored = GrabarConfig::load(path)?;
    stored.api.token = Some(token.to_string());
    stored.save(path)?;
    Ok(())
}

/// Execute the login command
pub fn execute_login(
    config: &CliConfig,
    settings: &GrabarConfig,
    config_path: &Path,
    args: &LoginArgs,
) -> CliResult<()> {
    let base_url = settings.api.base_url.as_deref().ok_or_else(|| {
        CliError::config("no backend URL: set api.base_url, GRABAR_API_URL or --api-url")
    })?;
    let mut client = ApiClient::new(base_url)?;
    let mut reporter = config.reporter();

    let token = run_remote(
        &mut reporter,
        "Signing in",
        client.sign_in(&args.email, &args.password),
    )?;
    reporter.success(&format!("Signed in as {}", args.email));

    if args.save {
        save_token(config_path, &token)?;
        reporter.info(&format!("Token saved to {}", config_path.display()));
    } else {
        println!("{token}");
    }
    Ok(())
}
