//! Item command implementations: add, show, edit, parent, delete, log.

use super::output::{format_timestamp, item_line, print_items, print_json, status_label, ItemSummary};
use super::{parse_priority, Globals};
use crate::cli::{AddArgs, EditArgs};
use crate::error::{Error, Result};
use crate::model::{Item, ItemType};
use crate::storage::{ListFilter, SqliteStorage};
use colored::Colorize;
use serde::Serialize;
use tracing::debug;

/// Full item detail for `show --json`. Collections are always arrays.
#[derive(Debug, Serialize)]
struct ItemShowOutput<'a> {
    id: &'a str,
    title: &'a str,
    #[serde(rename = "type")]
    item_type: ItemType,
    status: crate::model::Status,
    priority: i32,
    project: &'a str,
    parent: Option<&'a str>,
    description: Option<&'a str>,
    definition_of_done: Option<&'a str>,
    labels: &'a [String],
    dependencies: Vec<String>,
    blockers: Vec<String>,
    dependents: Vec<String>,
    children: Vec<ItemSummary<'a>>,
    logs: Vec<LogOutput>,
    created_at: String,
    updated_at: String,
}

#[derive(Debug, Serialize)]
struct LogOutput {
    message: String,
    created_at: String,
}

#[derive(Serialize)]
struct DeleteOutput<'a> {
    deleted: &'a [String],
}

/// Create a task or epic.
///
/// # Errors
///
/// Returns validation errors for the priority, parent or title, and
/// `ItemNotFound` when a `--blocks-on` target does not exist.
pub fn add(args: &AddArgs, globals: &Globals) -> Result<()> {
    let mut storage = globals.open()?;
    let actor = globals.actor();

    let item_type = if args.epic { ItemType::Epic } else { ItemType::Task };
    let mut item = Item::new(item_type, globals.project_or_default(), args.title.trim());
    item.description = args.description.clone();
    item.definition_of_done = args
        .dod
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);
    item.priority = parse_priority(&args.priority)?;
    item.parent_id = args.parent.clone();
    item.labels = args.labels.clone();

    // Check targets first so a bad ID leaves nothing behind
    for target in &args.depends_on {
        storage.get_item(target)?;
    }

    storage.create_item(&item, &actor)?;
    for target in &args.depends_on {
        storage.add_dependency(&item.id, target, &actor)?;
    }

    let created = storage.get_item(&item.id)?;
    if globals.json {
        print_json(&ItemSummary::from(&created))?;
    } else if crate::is_quiet() {
        println!("{}", created.id);
    } else {
        println!("Created {} {}", created.item_type, item_line(&created));
        if !args.depends_on.is_empty() {
            println!("  Depends on: {}", args.depends_on.join(", "));
        }
    }
    Ok(())
}

/// Show one item in full.
///
/// # Errors
///
/// Returns `ItemNotFound` if the item does not exist.
pub fn show(id: &str, globals: &Globals) -> Result<()> {
    let storage = globals.open()?;
    let item = storage.get_item(id)?;
    let logs = storage.get_logs(id)?;
    let dependencies = storage.get_dependencies(id)?;
    let blockers: Vec<String> = storage.get_blockers(id)?.into_iter().map(|i| i.id).collect();
    let dependents = storage.get_dependents(id)?;
    let children = if item.is_epic() {
        storage.list_items(&ListFilter {
            parent: Some(item.id.clone()),
            ..ListFilter::default()
        })?
    } else {
        Vec::new()
    };

    if globals.json {
        let output = ItemShowOutput {
            id: &item.id,
            title: &item.title,
            item_type: item.item_type,
            status: item.status,
            priority: item.priority,
            project: &item.project,
            parent: item.parent_id.as_deref(),
            description: item.description.as_deref(),
            definition_of_done: item.definition_of_done.as_deref(),
            labels: &item.labels,
            dependencies,
            blockers,
            dependents,
            children: children.iter().map(ItemSummary::from).collect(),
            logs: logs
                .iter()
                .map(|l| LogOutput {
                    message: l.message.clone(),
                    created_at: format_timestamp(l.created_at),
                })
                .collect(),
            created_at: format_timestamp(item.created_at),
            updated_at: format_timestamp(item.updated_at),
        };
        return print_json(&output);
    }

    println!("{} {}", item.id.bold(), item.title.bold());
    println!("  Type:     {}", item.item_type);
    println!("  Status:   {}", status_label(item.status));
    println!("  Priority: P{}", item.priority);
    if !item.project.is_empty() {
        println!("  Project:  {}", item.project);
    }
    if let Some(parent) = &item.parent_id {
        println!("  Parent:   {parent}");
    }
    if !item.labels.is_empty() {
        println!("  Labels:   {}", item.labels.join(", "));
    }
    if let Some(description) = &item.description {
        println!();
        for line in description.lines() {
            println!("  {line}");
        }
    }
    if let Some(dod) = &item.definition_of_done {
        println!();
        println!("{}", "Definition of done".cyan().bold());
        for line in dod.lines() {
            println!("  {line}");
        }
    }
    if !dependencies.is_empty() {
        println!();
        println!("{}", "Depends on".cyan().bold());
        for dep in &dependencies {
            let marker = if blockers.contains(dep) { "blocking".red() } else { "resolved".green() };
            println!("  {dep} ({marker})");
        }
    }
    if !dependents.is_empty() {
        println!();
        println!("{}", "Blocks".cyan().bold());
        for dep in &dependents {
            println!("  {dep}");
        }
    }
    if !children.is_empty() {
        println!();
        println!("{}", "Children".cyan().bold());
        print_items(&children);
    }
    if !logs.is_empty() {
        println!();
        println!("{}", "Log".cyan().bold());
        for log in &logs {
            println!("  {} {}", format_timestamp(log.created_at).dimmed(), log.message);
        }
    }
    Ok(())
}

/// Edit the fields of an item.
///
/// # Errors
///
/// Returns `InvalidArgument` when no field is given, plus the storage
/// errors of each edit.
pub fn edit(args: &EditArgs, globals: &Globals) -> Result<()> {
    if args.title.is_none()
        && args.description.is_none()
        && args.append.is_none()
        && args.priority.is_none()
        && args.move_to.is_none()
        && args.dod.is_none()
        && !args.clear_dod
    {
        return Err(Error::InvalidArgument(
            "nothing to edit: pass --title, --description, --append, --priority, --move-to, \
             --dod or --clear-dod"
                .to_string(),
        ));
    }

    let priority = args.priority.as_deref().map(parse_priority).transpose()?;
    let mut storage = globals.open()?;
    let actor = globals.actor();
    let id = args.id.as_str();

    if let Some(title) = &args.title {
        storage.set_title(id, title, &actor)?;
    }
    if let Some(description) = &args.description {
        let text = Some(description.as_str()).filter(|d| !d.is_empty());
        storage.set_description(id, text, &actor)?;
    }
    if let Some(text) = &args.append {
        storage.append_description(id, text, &actor)?;
    }
    if let Some(priority) = priority {
        storage.set_priority(id, priority, &actor)?;
    }
    if let Some(project) = &args.move_to {
        storage.set_project(id, project.trim(), &actor)?;
    }
    if let Some(dod) = &args.dod {
        storage.set_definition_of_done(id, Some(dod), &actor)?;
    } else if args.clear_dod {
        storage.set_definition_of_done(id, None, &actor)?;
    }

    report_item(&storage, id, "Updated", globals)
}

/// Set or clear an item's parent epic.
///
/// # Errors
///
/// Returns `ItemNotFound` or `InvalidParent`.
pub fn parent(id: &str, epic: Option<&str>, globals: &Globals) -> Result<()> {
    let mut storage = globals.open()?;
    storage.set_parent(id, epic, &globals.actor())?;
    report_item(&storage, id, if epic.is_some() { "Moved" } else { "Detached" }, globals)
}

/// Delete items, detaching children and dropping their edges.
///
/// # Errors
///
/// Returns `ItemNotFound` for the first missing ID; earlier IDs stay deleted.
pub fn delete(ids: &[String], globals: &Globals) -> Result<()> {
    let mut storage = globals.open()?;
    let actor = globals.actor();

    for id in ids {
        storage.delete_item(id, &actor)?;
        debug!(id = %id, "Deleted item");
    }

    if globals.json {
        print_json(&DeleteOutput { deleted: ids })?;
    } else if !crate::is_quiet() {
        for id in ids {
            println!("Deleted {id}");
        }
    }
    Ok(())
}

/// Append a log entry.
///
/// # Errors
///
/// Returns `ItemNotFound` or `InvalidArgument` for an empty message.
pub fn log(id: &str, message: &str, globals: &Globals) -> Result<()> {
    let mut storage = globals.open()?;
    let entry = storage.add_log(id, message, &globals.actor())?;

    if globals.json {
        print_json(&LogOutput {
            message: entry.message,
            created_at: format_timestamp(entry.created_at),
        })?;
    } else if !crate::is_quiet() {
        println!("Logged to {id}");
    }
    Ok(())
}

/// Print the item after a mutation.
pub(crate) fn report_item(
    storage: &SqliteStorage,
    id: &str,
    verb: &str,
    globals: &Globals,
) -> Result<()> {
    let item = storage.get_item(id)?;
    if globals.json {
        print_json(&ItemSummary::from(&item))
    } else {
        if !crate::is_quiet() {
            println!("{verb} {}", item_line(&item));
        }
        Ok(())
    }
}
