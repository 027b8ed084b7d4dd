//! Project command handler

use super::{api_client, run_remote};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::ProjectCommand;
use grabar::{GrabarConfig, NewProject, Project, ProjectPatch};

/// One table row per project
#[must_use]
pub fn format_projects(projects: &[Project]) -> String {
    let width = projects.iter().map(|p| p.id.len()).max().unwrap_or(2).max(2);
    let mut out = format!("{:<width$}  NAME\n", "ID");
    for project in projects {
        out.push_str(&format!("{:<width$}  {}", project.id, project.name));
        if let Some(description) = project.description.as_deref().filter(|d| !d.is_empty()) {
            out.push_str(&format!(" ({description})"));
        }
        out.push('\n');
    }
    out
}

/// Execute a project subcommand
pub fn execute_project(
    config: &CliConfig,
    settings: &GrabarConfig,
    command: &ProjectCommand,
) -> CliResult<()> {
    let client = api_client(settings)?;
    let mut reporter = config.reporter();

    match command {
        ProjectCommand::List => {
            let projects = run_remote(&mut reporter, "Fetching projects", client.list_projects())?;
            if projects.is_empty() {
                reporter.info("No projects");
            } else {
                print!("{}", format_projects(&projects));
            }
        }
        ProjectCommand::Create { name, description } => {
            let body = NewProject {
                name: name.clone(),
                description: description.clone(),
            };
            let project = run_remote(&mut reporter, "Creating project", client.create_project(&body))?;
            reporter.success(&format!("Created project {} ({})", project.name, project.id));
            println!("{}", project.id);
        }
        ProjectCommand::Update {
            id,
            name,
            description,
        } => {
            if name.is_none() && description.is_none() {
                return Err(CliError::invalid_argument("nothing to update: pass --name or --description"));
            }
            let patch = ProjectPatch {
                name: name.clone(),
                description: description.clone(),
            };
            let project =
                run_remote(&mut reporter, "Updating project", client.update_project(id, &patch))?;
            reporter.success(&format!("Updated project {} ({})", project.name, project.id));
        }
        ProjectCommand::Delete { id } => {
            run_remote(&mut reporter, "Deleting project", client.delete_project(id))?;
            reporter.success(&format!("Deleted project {id}"));
        }
    }
    Ok(())
}
