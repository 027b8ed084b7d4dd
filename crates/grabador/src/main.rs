//! Grabador CLI
//!
//! ## Usage
//!
//! ```bash
//! grabador record page.html events.json -o actions.json
//! grabador emit actions.json --target javascript -o signup.js --manifest
//! grabador verify signup.js
//! grabador script upload <project-id> signup.js
//! ```

use clap::Parser;
use grabador::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match grabador::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
