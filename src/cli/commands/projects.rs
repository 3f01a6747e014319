//! Projects command implementation.

use super::output::print_json;
use super::Globals;
use crate::error::Result;
use crate::model::Project;
use serde::Serialize;

#[derive(Serialize)]
struct ProjectsOutput {
    projects: Vec<Project>,
    count: usize,
}

/// List every registered project.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or queried.
pub fn execute(globals: &Globals) -> Result<()> {
    let storage = globals.open()?;
    let projects = storage.list_projects()?;

    if globals.json {
        return print_json(&ProjectsOutput {
            count: projects.len(),
            projects,
        });
    }

    if projects.is_empty() {
        println!("No projects yet. Items created with -p <name> register one.");
        return Ok(());
    }
    for project in &projects {
        match &project.description {
            Some(description) => println!("{}  {description}", project.name),
            None => println!("{}", project.name),
        }
    }
    Ok(())
}
