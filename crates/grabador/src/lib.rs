//! Grabador: command-line front end for Grabar
//!
//! Runs the native-messaging recording host, replays captured events into
//! action sequences, generates Selenium scripts and talks to the
//! project/script backend.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;

pub use commands::{
    BrowserArg, Cli, ColorArg, Commands, ConfigCommand, EmitArgs, LocateArgs, LoginArgs,
    ProjectCommand, RecordArgs, ScriptCommand, TargetArg, VerifyArgs,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::ProgressReporter;

use grabar::GrabarConfig;

/// Verbosity and color from the global flags
#[must_use]
pub fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.into())
}

/// Configuration file with `--api-url`/`--token` (or their environment
/// variables) layered on top
pub fn load_settings(cli: &Cli) -> CliResult<GrabarConfig> {
    let mut settings = GrabarConfig::load(&cli.config)?;
    if let Some(url) = &cli.api_url {
        settings.api.base_url = Some(url.clone());
    }
    if let Some(token) = &cli.token {
        settings.api.token = Some(token.clone());
    }
    settings.validate()?;
    Ok(settings)
}

/// Dispatch a parsed command line
pub fn run(cli: &Cli) -> CliResult<()> {
    let config = build_config(cli);
    logging::init_tracing(&config);
    tracing::debug!(command = ?cli.command, "grabador starting");

    if let Commands::Config(command @ ConfigCommand::Init { .. }) = &cli.command {
        return handlers::execute_config(&config, &GrabarConfig::default(), &cli.config, command);
    }

    let settings = load_settings(cli)?;
    match &cli.command {
        Commands::Host => handlers::execute_host(&settings),
        Commands::Locate(args) => handlers::execute_locate(&config, &settings, args),
        Commands::Record(args) => handlers::execute_record(&config, &settings, args),
        Commands::Emit(args) => handlers::execute_emit(&config, &settings, args),
        Commands::Verify(args) => handlers::execute_verify(&config, args),
        Commands::Project(command) => handlers::execute_project(&config, &settings, command),
        Commands::Script(command) => handlers::execute_script(&config, &settings, command),
        Commands::Login(args) => handlers::execute_login(&config, &settings, &cli.config, args),
        Commands::Config(command) => handlers::execute_config(&config, &settings, &cli.config, command),
    }
}
