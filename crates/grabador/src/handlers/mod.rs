//! Command handlers - one module per subcommand
//!
//! Each handler module contains:
//! - The execution logic for a CLI command
//! - Pure helper functions
//! - Tests for those helpers

pub mod config;
pub mod emit;
pub mod host;
pub mod locate;
pub mod login;
pub mod project;
pub mod record;
pub mod script;
pub mod verify;

pub use config::execute_config;
pub use emit::{emit_options, execute_emit};
pub use host::execute_host;
pub use locate::{execute_locate, find_target};
pub use login::execute_login;
pub use project::execute_project;
pub use record::{execute_record, replay, CapturedEvent};
pub use script::execute_script;
pub use verify::execute_verify;

use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use grabar::{ApiClient, GrabarConfig};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::path::Path;

/// Read and deserialize a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let text = std::fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|err| CliError::input(path, err.to_string()))
}

/// Write `text` to `path`, or stdout when no path is given
pub fn write_output(path: Option<&Path>, text: &str) -> CliResult<()> {
    match path {
        Some(path) => std::fs::write(path, text)?,
        None => {
            use std::io::Write;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            if !text.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}

/// Backend client from the effective configuration
pub fn api_client(settings: &GrabarConfig) -> CliResult<ApiClient> {
    let base_url = settings.api.base_url.as_deref().ok_or_else(|| {
        CliError::config("no backend URL: set api.base_url, GRABAR_API_URL or --api-url")
    })?;
    let client = ApiClient::new(base_url)?;
    Ok(match settings.api.token.as_deref() {
        Some(token) => client.with_token(token),
        None => client,
    })
}

/// Run one backend call on a fresh runtime behind a spinner
pub fn run_remote<T, F>(reporter: &mut ProgressReporter, message: &str, call: F) -> CliResult<T>
where
    F: Future<Output = grabar::GrabarResult<T>>,
{
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::config(format!("Failed to create runtime: {e}")))?;
    reporter.start_spinner(message);
    let result = rt.block_on(call);
    reporter.finish_spinner();
    result.map_err(|err| {
        reporter.failure(&err.to_string());
        CliError::from(err)
    })
}
