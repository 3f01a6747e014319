//! Dependency command implementations.

use super::output::{print_json, status_glyph};
use super::Globals;
use crate::cli::DepCommands;
use crate::error::Result;
use serde::Serialize;

#[derive(Serialize)]
struct DepChangeOutput<'a> {
    item_id: &'a str,
    depends_on: &'a str,
    action: &'a str,
}

#[derive(Serialize)]
struct DepListOutput {
    id: String,
    dependencies: Vec<String>,
    dependents: Vec<String>,
    unmet: bool,
}

/// Execute dep subcommands.
///
/// # Errors
///
/// Returns `ItemNotFound` for missing endpoints and `CycleDetected` when
/// an edge would close a loop.
pub fn execute(command: &DepCommands, globals: &Globals) -> Result<()> {
    match command {
        DepCommands::Add { item, depends_on } => {
            let mut storage = globals.open()?;
            storage.add_dependency(item, depends_on, &globals.actor())?;
            report_change(item, depends_on, "added", globals)
        }
        DepCommands::Remove { item, depends_on } => {
            let mut storage = globals.open()?;
            storage.remove_dependency(item, depends_on, &globals.actor())?;
            report_change(item, depends_on, "removed", globals)
        }
        DepCommands::List { id: Some(id) } => list_one(id, globals),
        DepCommands::List { id: None } => list_all(globals),
    }
}

fn report_change(item: &str, depends_on: &str, action: &str, globals: &Globals) -> Result<()> {
    if globals.json {
        print_json(&DepChangeOutput {
            item_id: item,
            depends_on,
            action,
        })
    } else {
        if !crate::is_quiet() {
            println!("Dependency {action}: {item} → {depends_on}");
        }
        Ok(())
    }
}

fn list_one(id: &str, globals: &Globals) -> Result<()> {
    let storage = globals.open()?;
    storage.get_item(id)?;
    let output = DepListOutput {
        id: id.to_string(),
        dependencies: storage.get_dependencies(id)?,
        dependents: storage.get_dependents(id)?,
        unmet: storage.has_unmet_dependencies(id)?,
    };

    if globals.json {
        return print_json(&output);
    }

    println!("{id}");
    if output.dependencies.is_empty() {
        println!("  depends on: (nothing)");
    } else {
        for dep in &output.dependencies {
            let status = storage.get_effective_status(dep)?;
            println!("  depends on: {} {dep}", status_glyph(status));
        }
    }
    for dep in &output.dependents {
        let status = storage.get_effective_status(dep)?;
        println!("  blocks:     {} {dep}", status_glyph(status));
    }
    Ok(())
}

fn list_all(globals: &Globals) -> Result<()> {
    let storage = globals.open()?;
    let edges = storage.get_all_dependencies(globals.project.as_deref())?;

    if globals.json {
        return print_json(&edges);
    }

    if edges.is_empty() {
        println!("No dependencies.");
        return Ok(());
    }
    for edge in &edges {
        println!(
            "{} {} {} → {} {} {}",
            status_glyph(edge.item_status),
            edge.item_id,
            edge.item_title,
            status_glyph(edge.depends_on_status),
            edge.depends_on,
            edge.depends_on_title,
        );
    }
    Ok(())
}
