//! History command: the audit trail of one item.

use super::output::{format_timestamp, print_json};
use super::Globals;
use crate::error::Result;
use crate::storage::events::Event;
use colored::Colorize;
use serde::Serialize;

#[derive(Serialize)]
struct HistoryOutput<'a> {
    id: &'a str,
    events: Vec<Event>,
    count: usize,
}

/// Show who changed an item and how, newest first.
///
/// # Errors
///
/// Returns `ItemNotFound` when the item does not exist.
pub fn execute(id: &str, limit: Option<u32>, globals: &Globals) -> Result<()> {
    let storage = globals.open()?;
    storage.get_item(id)?;
    let events = storage.get_item_events(id, limit)?;

    if globals.json {
        return print_json(&HistoryOutput {
            id,
            count: events.len(),
            events,
        });
    }

    if events.is_empty() {
        println!("{id}: no recorded changes");
        return Ok(());
    }
    for event in &events {
        let change = match (&event.old_value, &event.new_value) {
            (Some(old), Some(new)) => format!(" {old} → {new}"),
            (None, Some(new)) => format!(" +{new}"),
            (Some(old), None) => format!(" -{old}"),
            (None, None) => String::new(),
        };
        let note = event
            .comment
            .as_deref()
            .map(|c| format!(" ({c})"))
            .unwrap_or_default();
        println!(
            "{} {:<15} {}{change}{note}",
            format_timestamp(event.created_at).dimmed(),
            event.event_type.as_str(),
            event.actor.cyan(),
        );
    }
    Ok(())
}
