//! Host command handler

use crate::error::CliResult;
use grabar::{GrabarConfig, RecordingHost};
use std::io::{BufReader, BufWriter};

/// Serve native messages on stdin/stdout until the browser closes the pipe
pub fn execute_host(settings: &GrabarConfig) -> CliResult<()> {
    let mut host = RecordingHost::new(settings.emit.clone());
    tracing::info!("recording host listening on stdio");

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let handled = host.serve(BufReader::new(stdin.lock()), BufWriter::new(stdout.lock()))?;
    tracing::debug!(handled, "recording host stopped");
    Ok(())
}
