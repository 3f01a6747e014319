//! Human-readable rendering shared by commands.

use crate::error::Result;
use crate::model::{Item, ItemType, Status};
use colored::{ColoredString, Colorize};
use serde::Serialize;

/// One-character status marker.
#[must_use]
pub fn status_glyph(status: Status) -> ColoredString {
    match status {
        Status::Open => "○".normal(),
        Status::InProgress => "◐".yellow(),
        Status::Blocked => "●".red(),
        Status::Reviewing => "◑".cyan(),
        Status::Done => "✓".green(),
        Status::Canceled => "✗".dimmed(),
    }
}

#[must_use]
pub fn status_label(status: Status) -> ColoredString {
    let text = status.as_str();
    match status {
        Status::Open => text.normal(),
        Status::InProgress => text.yellow(),
        Status::Blocked => text.red(),
        Status::Reviewing => text.cyan(),
        Status::Done => text.green(),
        Status::Canceled => text.dimmed(),
    }
}

/// `○ ts-1a2b3c [P2] Title` with an `[epic]` tag for epics.
#[must_use]
pub fn item_line(item: &Item) -> String {
    let kind = if item.item_type == ItemType::Epic {
        format!(" {}", "[epic]".magenta())
    } else {
        String::new()
    };
    format!(
        "{} {} {}{} {}",
        status_glyph(item.status),
        item.id.dimmed(),
        format!("[P{}]", item.priority).dimmed(),
        kind,
        item.title
    )
}

pub fn print_items(items: &[Item]) {
    for item in items {
        println!("  {}", item_line(item));
    }
}

/// Print a value as a single JSON line on stdout.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

/// RFC 3339 rendering of a millisecond timestamp.
#[must_use]
pub fn format_timestamp(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map_or_else(|| ms.to_string(), |dt| dt.to_rfc3339())
}

/// Compact item shape used by list-style JSON output.
#[derive(Debug, Serialize)]
pub struct ItemSummary<'a> {
    pub id: &'a str,
    pub title: &'a str,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub status: Status,
    pub priority: i32,
    pub project: &'a str,
    pub parent: Option<&'a str>,
}

impl<'a> From<&'a Item> for ItemSummary<'a> {
    fn from(item: &'a Item) -> Self {
        Self {
            id: &item.id,
            title: &item.title,
            item_type: item.item_type,
            status: item.status,
            priority: item.priority,
            project: &item.project,
            parent: item.parent_id.as_deref(),
        }
    }
}

#[must_use]
pub fn summaries(items: &[Item]) -> Vec<ItemSummary<'_>> {
    items.iter().map(ItemSummary::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp_is_rfc3339() {
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_item_line_marks_epics() {
        colored::control::set_override(false);
        let epic = Item::new(ItemType::Epic, "", "Launch");
        let line = item_line(&epic);
        assert!(line.contains("[epic]"));
        assert!(line.contains(&epic.id));
        assert!(line.contains("[P2]"));

        let task = Item::new(ItemType::Task, "", "Write");
        assert!(!item_line(&task).contains("[epic]"));
    }

    #[test]
    fn test_summary_json_shape() {
        let mut item = Item::new(ItemType::Task, "api", "Fix");
        item.parent_id = Some("ep-000001".into());
        let json = serde_json::to_value(ItemSummary::from(&item)).unwrap();
        assert_eq!(json["type"], "task");
        assert_eq!(json["status"], "open");
        assert_eq!(json["parent"], "ep-000001");
        assert_eq!(json["project"], "api");
    }
}
