//! Status command implementation.

use super::output::{print_items, print_json, status_glyph};
use super::Globals;
use crate::error::Result;
use crate::model::Status;
use colored::Colorize;

/// Execute the status command for the current project (all items when no
/// project is set).
///
/// # Errors
///
/// Returns an error if the database cannot be opened or queried.
pub fn execute(globals: &Globals) -> Result<()> {
    let storage = globals.open()?;
    let report = storage.project_status_report(globals.project.as_deref())?;

    if globals.json {
        return print_json(&report);
    }

    let scope = report.project.as_deref().unwrap_or("all projects");
    println!("{}", format!("Status: {scope}").bold());
    println!();

    if report.total() == 0 {
        println!("No items yet. Create one with: prog add \"Title\"");
        return Ok(());
    }

    for (status, count) in [
        (Status::Open, report.open),
        (Status::InProgress, report.in_progress),
        (Status::Reviewing, report.reviewing),
        (Status::Blocked, report.blocked),
        (Status::Done, report.done),
        (Status::Canceled, report.canceled),
    ] {
        println!("  {} {:<12} {count}", status_glyph(status), status.as_str());
    }
    println!("  {:<14} {}", "ready", report.ready);

    for (title, items) in [
        ("In progress", &report.in_progress_items),
        ("In review", &report.reviewing_items),
        ("Blocked", &report.blocked_items),
        ("Ready", &report.ready_items),
        ("Recently done", &report.recent_done),
    ] {
        if items.is_empty() {
            continue;
        }
        println!();
        println!("{}", title.cyan().bold());
        print_items(items);
    }

    Ok(())
}
