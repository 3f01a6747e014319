//! List and ready commands.

use super::output::{print_items, print_json, summaries};
use super::Globals;
use crate::cli::ListArgs;
use crate::error::Result;
use crate::model::{ItemType, Status};
use crate::storage::ListFilter;
use serde::Serialize;

#[derive(Serialize)]
struct ListOutput<'a> {
    items: Vec<super::output::ItemSummary<'a>>,
    count: usize,
}

/// Translate CLI arguments into a storage filter.
///
/// # Errors
///
/// Returns `InvalidStatus` / `InvalidType` for unrecognised values.
pub fn build_filter(args: &ListArgs, project: Option<&str>) -> Result<ListFilter> {
    Ok(ListFilter {
        project: project.map(str::to_string),
        status: args.status.as_deref().map(str::parse::<Status>).transpose()?,
        item_type: args.item_type.as_deref().map(str::parse::<ItemType>).transpose()?,
        parent: args.parent.clone(),
        blocking: args.blocking.clone(),
        blocked_by: args.blocked_by.clone(),
        has_blockers: args.has_blockers,
        no_blockers: args.no_blockers,
        labels: args.labels.clone(),
        limit: args.limit,
    })
}

/// Execute the list command.
///
/// # Errors
///
/// Returns validation errors for bad filters or a storage error.
pub fn list(args: &ListArgs, globals: &Globals) -> Result<()> {
    let filter = build_filter(args, globals.project.as_deref())?;
    let storage = globals.open()?;
    let items = storage.list_items(&filter)?;

    if globals.json {
        return print_json(&ListOutput {
            count: items.len(),
            items: summaries(&items),
        });
    }

    if items.is_empty() {
        println!("No items found.");
    } else {
        print_items(&items);
        println!();
        println!("{} item(s)", items.len());
    }
    Ok(())
}

/// Execute the ready command.
///
/// # Errors
///
/// Returns a storage error if the query fails.
pub fn ready(labels: &[String], limit: Option<usize>, globals: &Globals) -> Result<()> {
    let storage = globals.open()?;
    let mut items = storage.list_ready(globals.project.as_deref(), labels)?;
    if let Some(limit) = limit {
        items.truncate(limit);
    }

    if globals.json {
        // Always an array, even when empty
        return print_json(&summaries(&items));
    }

    if items.is_empty() {
        println!("Nothing ready. Check `prog list --has-blockers` for blocked work.");
    } else {
        println!("Ready to work on:");
        print_items(&items);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_build_filter_normalizes_values() {
        let args = ListArgs {
            status: Some("wip".into()),
            item_type: Some("epic".into()),
            labels: vec!["api".into()],
            ..ListArgs::default()
        };
        let filter = build_filter(&args, Some("web")).unwrap();
        assert_eq!(filter.status, Some(Status::InProgress));
        assert_eq!(filter.item_type, Some(ItemType::Epic));
        assert_eq!(filter.project.as_deref(), Some("web"));
        assert_eq!(filter.labels, vec!["api".to_string()]);
    }

    #[test]
    fn test_build_filter_rejects_unknown_status() {
        let args = ListArgs {
            status: Some("pending-ish".into()),
            ..ListArgs::default()
        };
        assert!(matches!(
            build_filter(&args, None),
            Err(Error::InvalidStatus { .. })
        ));
    }
}
