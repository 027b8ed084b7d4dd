//! Script command handler

use std::path::Path;

use super::{api_client, run_remote, write_output};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::ScriptCommand;
use grabar::script::FileManifest;
use grabar::{GrabarConfig, NewScript, SavedScript, ScriptLanguage};

/// Build the upload body for a script file.
///
/// A manifest sidecar, when present, must match the file and supplies the
/// language and step count; otherwise the language follows the extension.
pub fn upload_body(path: &Path, name: Option<&str>) -> CliResult<NewScript> {
    let content = std::fs::read_to_string(path)?;
    let name = name
        .map(str::to_string)
        .or_else(|| path.file_stem().map(|s| s.to_string_lossy().to_string()))
        .ok_or_else(|| CliError::invalid_argument(format!("no script name for {}", path.display())))?;

    if FileManifest::manifest_path(path).exists() {
        let manifest = grabar::script::verify(path)?;
        return Ok(NewScript {
            name,
            language: manifest.generation.target,
            content,
            action_count: manifest.block_count,
        });
    }

    let language = match path.extension().and_then(|e| e.to_str()) {
        Some("py") => ScriptLanguage::Python,
        Some("js" | "mjs") => ScriptLanguage::JavaScript,
        _ => {
            return Err(CliError::invalid_argument(format!(
                "cannot tell the script language of {}",
                path.display()
            )))
        }
    };
    let marker = match language {
        ScriptLanguage::Python => "# Step ",
        ScriptLanguage::JavaScript => "// Step ",
    };
    let action_count = content
        .lines()
        .filter(|line| line.trim_start().starts_with(marker))
        .count();
    Ok(NewScript {
        name,
        language,
        content,
        action_count,
    })
}

/// One table row per saved script
#[must_use]
pub fn format_scripts(scripts: &[SavedScript]) -> String {
    let width = scripts.iter().map(|s| s.id.len()).max().unwrap_or(2).max(2);
    let mut out = format!("{:<width$}  {:<10}  {:>5}  NAME\n", "ID", "LANGUAGE", "STEPS");
    for script in scripts {
        out.push_str(&format!(
            "{:<width$}  {:<10}  {:>5}  {}\n",
            script.id,
            script.language.as_str(),
            script.action_count,
            script.name
        ));
    }
    out
}

/// Execute a script subcommand
pub fn execute_script(
    config: &CliConfig,
    settings: &GrabarConfig,
    command: &ScriptCommand,
) -> CliResult<()> {
    let client = api_client(settings)?;
    let mut reporter = config.reporter();

    match command {
        ScriptCommand::List { project } => {
            let scripts = run_remote(&mut reporter, "Fetching scripts", client.list_scripts(project))?;
            if scripts.is_empty() {
                reporter.info(&format!("No scripts in project {project}"));
            } else {
                print!("{}", format_scripts(&scripts));
            }
        }
        ScriptCommand::Upload {
            project,
            file,
            name,
        } => {
            let body = upload_body(file, name.as_deref())?;
            let saved =
                run_remote(&mut reporter, "Uploading script", client.create_script(project, &body))?;
            tracing::info!(id = saved.id.as_str(), project = project.as_str(), "script uploaded");
            reporter.success(&format!("Uploaded {} as {}", file.display(), saved.id));
            println!("{}", saved.id);
        }
        ScriptCommand::Download { id, output } => {
            let saved = run_remote(&mut reporter, "Downloading script", client.get_script(id))?;
            write_output(output.as_deref(), &saved.content)?;
            if let Some(path) = output {
                reporter.success(&format!("Saved {} to {}", saved.name, path.display()));
            }
        }
        ScriptCommand::Delete { id } => {
            run_remote(&mut reporter, "Deleting script", client.delete_script(id))?;
            reporter.success(&format!("Deleted script {id}"));
        }
    }
    Ok(())
}
