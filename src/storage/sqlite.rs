//! SQLite storage implementation.
//!
//! Items, logs, labels and projects live here. Dependency edges are in
//! [`super::deps`] and the read-side queries in [`super::queries`]; both add
//! methods to [`SqliteStorage`].
//!
//! Every write goes through [`SqliteStorage::mutate`], which wraps the change
//! and its audit events in one IMMEDIATE transaction.

use crate::engine::{derive_status, ChildCounts};
use crate::error::{Error, Result};
use crate::model::{Item, ItemType, Log, Project, Status};
use crate::storage::deps::waits_on;
use crate::storage::events::{get_events, insert_event, Event, EventType};
use crate::storage::schema::apply_schema;
use crate::validate::find_similar_ids;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Item columns in row order, for a table aliased `item`.
///
/// Alias `i` is left free for [`crate::engine::DEP_UNRESOLVED_SQL`] in
/// correlated subqueries.
pub(crate) const ITEM_COLUMNS: &str = "item.id, item.project, item.type, item.title, \
     item.description, item.status, item.priority, item.parent_id, item.created_at, \
     item.updated_at, item.definition_of_done";

/// How long a connection waits on a locked database before failing.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based storage backend.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

/// Context for a mutation operation.
///
/// Passed to mutation closures to collect audit events, which are written
/// just before commit.
pub struct MutationContext {
    /// Name of the operation being performed.
    pub op_name: String,
    /// Actor performing the operation (agent ID, user, etc.).
    pub actor: String,
    /// Events to write at the end of the transaction.
    pub events: Vec<Event>,
}

impl MutationContext {
    #[must_use]
    pub fn new(op_name: &str, actor: &str) -> Self {
        Self {
            op_name: op_name.to_string(),
            actor: actor.to_string(),
            events: Vec::new(),
        }
    }

    /// Record an event for this operation.
    pub fn record_event(&mut self, entity_type: &str, entity_id: &str, event_type: EventType) {
        self.events
            .push(Event::new(entity_type, entity_id, event_type, &self.actor));
    }

    /// Record an event with old/new values for field tracking.
    pub fn record_change(
        &mut self,
        entity_type: &str,
        entity_id: &str,
        event_type: EventType,
        old_value: Option<String>,
        new_value: Option<String>,
    ) {
        self.events.push(
            Event::new(entity_type, entity_id, event_type, &self.actor)
                .with_values(old_value, new_value),
        );
    }
}

impl SqliteStorage {
    /// Open a database at the given path.
    ///
    /// Creates the database and applies schema if it doesn't exist. Writers
    /// wait up to [`BUSY_TIMEOUT`] for a competing lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or schema fails.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        apply_schema(&conn)?;
        debug!(path = %path.display(), "Opened database");
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection (for read operations).
    #[must_use]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Execute a mutation with the transaction protocol.
    ///
    /// 1. Begins an IMMEDIATE transaction (for write locking)
    /// 2. Executes the mutation closure
    /// 3. Writes audit events
    /// 4. Commits (or rolls back on error)
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails. The transaction is rolled back on error.
    pub fn mutate<F, R>(&mut self, op: &str, actor: &str, f: F) -> Result<R>
    where
        F: FnOnce(&Transaction, &mut MutationContext) -> Result<R>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let mut ctx = MutationContext::new(op, actor);

        let result = f(&tx, &mut ctx)?;

        for event in &ctx.events {
            insert_event(&tx, event)?;
        }

        tx.commit()?;
        debug!(op, events = ctx.events.len(), "Mutation committed");

        Ok(result)
    }

    // ===============
    // Item Operations
    // ===============

    /// Create a new item.
    ///
    /// Registers the item's project if it is new, and attaches any labels on
    /// the item, all in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty title, `InvalidPriority` outside
    /// 1-3, `ItemNotFound` if the parent is missing and `InvalidParent` if the
    /// parent is not an epic.
    pub fn create_item(&mut self, item: &Item, actor: &str) -> Result<()> {
        validate_title(&item.title)?;
        validate_priority(item.priority)?;

        if item.is_epic() && !item.status.is_terminal() && item.status != Status::Open {
            return Err(Error::InvalidTransition {
                id: item.id.clone(),
                requested: item.status.to_string(),
            });
        }

        self.mutate("create_item", actor, |tx, ctx| {
            if let Some(parent_id) = &item.parent_id {
                check_parent(tx, &item.id, item.item_type, parent_id)?;
            }

            tx.execute(
                "INSERT INTO items (id, project, type, title, description, definition_of_done, status, priority, parent_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    item.id,
                    item.project,
                    item.item_type.as_str(),
                    item.title,
                    item.description,
                    item.definition_of_done,
                    item.status.as_str(),
                    item.priority,
                    item.parent_id,
                    item.created_at,
                    item.updated_at,
                ],
            )?;

            ensure_project(tx, ctx, &item.project, item.created_at)?;

            for label in &item.labels {
                let label = validate_label(label)?;
                tx.execute(
                    "INSERT OR IGNORE INTO labels (item_id, name) VALUES (?1, ?2)",
                    params![item.id, label],
                )?;
            }

            ctx.record_event("item", &item.id, EventType::ItemCreated);
            info!(id = %item.id, kind = %item.item_type, "Created item");
            Ok(())
        })
    }

    /// Get an item by ID with its effective status and labels.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` (with suggestions when close IDs exist).
    pub fn get_item(&self, id: &str) -> Result<Item> {
        let mut item = require_item(&self.conn, id)?;
        item.status = effective_status(&self.conn, &item)?;
        item.labels = load_labels(&self.conn, &item.id)?;
        Ok(item)
    }

    /// Set an item's stored status.
    ///
    /// Epics only accept `done` and `canceled`; everything else about an
    /// epic's status comes from its children.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` or `InvalidTransition`.
    pub fn update_status(&mut self, id: &str, status: Status, actor: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();

        self.mutate("update_status", actor, |tx, ctx| {
            let item = require_item(tx, id)?;

            if item.is_epic() && !status.is_terminal() {
                return Err(Error::InvalidTransition {
                    id: id.to_string(),
                    requested: status.to_string(),
                });
            }

            tx.execute(
                "UPDATE items SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status.as_str(), now, id],
            )?;

            ctx.record_change(
                "item",
                id,
                EventType::StatusChanged,
                Some(item.status.to_string()),
                Some(status.to_string()),
            );
            info!(id, from = %item.status, to = %status, "Status changed");
            Ok(())
        })
    }

    /// Attach an item to an epic, or detach it with `None`.
    ///
    /// Epics may be nested, but derivation only looks at direct children, so
    /// the nested epic's own children do not reach the outer epic.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` for a missing item or parent, `InvalidParent`
    /// if the parent is not an epic, `InvalidArgument` for self-parenting and
    /// `CycleDetected` when the task already waits on that epic.
    pub fn set_parent(&mut self, id: &str, parent_id: Option<&str>, actor: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();

        self.mutate("set_parent", actor, |tx, ctx| {
            let item = require_item(tx, id)?;
            if let Some(parent_id) = parent_id {
                check_parent(tx, id, item.item_type, parent_id)?;
                if item.item_type == ItemType::Task && waits_on(tx, id, parent_id)? {
                    return Err(Error::CycleDetected {
                        item_id: parent_id.to_string(),
                        depends_on: id.to_string(),
                    });
                }
            }

            tx.execute(
                "UPDATE items SET parent_id = ?1, updated_at = ?2 WHERE id = ?3",
                params![parent_id, now, id],
            )?;

            ctx.record_change(
                "item",
                id,
                EventType::ParentChanged,
                item.parent_id,
                parent_id.map(str::to_string),
            );
            Ok(())
        })
    }

    /// Replace an item's title.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty title or `ItemNotFound`.
    pub fn set_title(&mut self, id: &str, title: &str, actor: &str) -> Result<()> {
        validate_title(title)?;
        self.update_column("set_title", id, "title", &title, actor)
    }

    /// Replace (or clear, with `None`) an item's description.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if the item does not exist.
    pub fn set_description(&mut self, id: &str, text: Option<&str>, actor: &str) -> Result<()> {
        self.update_column("set_description", id, "description", &text, actor)
    }

    /// Replace (or clear, with `None`) an item's definition of done.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if the item does not exist.
    pub fn set_definition_of_done(
        &mut self,
        id: &str,
        text: Option<&str>,
        actor: &str,
    ) -> Result<()> {
        let text = text.map(str::trim).filter(|t| !t.is_empty());
        self.update_column("set_definition_of_done", id, "definition_of_done", &text, actor)
    }

    /// Append a paragraph to an item's description.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if the item does not exist.
    pub fn append_description(&mut self, id: &str, text: &str, actor: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();

        self.mutate("append_description", actor, |tx, ctx| {
            let rows = tx.execute(
                "UPDATE items
                 SET description = CASE
                         WHEN description IS NULL OR description = '' THEN ?1
                         ELSE description || char(10) || char(10) || ?1
                     END,
                     updated_at = ?2
                 WHERE id = ?3",
                params![text, now, id],
            )?;
            if rows == 0 {
                return Err(not_found(tx, id)?);
            }

            ctx.events.push(
                Event::new("item", id, EventType::ItemUpdated, &ctx.actor)
                    .with_comment("description appended"),
            );
            Ok(())
        })
    }

    /// Change an item's priority (1 = high, 3 = low).
    ///
    /// # Errors
    ///
    /// Returns `InvalidPriority` outside 1-3 or `ItemNotFound`.
    pub fn set_priority(&mut self, id: &str, priority: i32, actor: &str) -> Result<()> {
        validate_priority(priority)?;
        self.update_column("set_priority", id, "priority", &priority, actor)
    }

    /// Move an item to another project, registering it if new.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if the item does not exist.
    pub fn set_project(&mut self, id: &str, project: &str, actor: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();

        self.mutate("set_project", actor, |tx, ctx| {
            let item = require_item(tx, id)?;
            tx.execute(
                "UPDATE items SET project = ?1, updated_at = ?2 WHERE id = ?3",
                params![project, now, id],
            )?;
            ensure_project(tx, ctx, project, now)?;

            ctx.record_change(
                "item",
                id,
                EventType::ItemUpdated,
                Some(item.project),
                Some(project.to_string()),
            );
            Ok(())
        })
    }

    /// Delete an item with its logs, labels and every dependency edge that
    /// touches it. Children of a deleted epic are detached.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if the item does not exist.
    pub fn delete_item(&mut self, id: &str, actor: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();

        self.mutate("delete_item", actor, |tx, ctx| {
            require_item(tx, id)?;

            tx.execute("DELETE FROM logs WHERE item_id = ?1", [id])?;
            tx.execute("DELETE FROM labels WHERE item_id = ?1", [id])?;
            let edges = tx.execute(
                "DELETE FROM deps WHERE item_id = ?1 OR depends_on = ?1",
                [id],
            )?;

            let mut stmt = tx.prepare("SELECT id FROM items WHERE parent_id = ?1")?;
            let children = stmt
                .query_map([id], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            tx.execute(
                "UPDATE items SET parent_id = NULL, updated_at = ?1 WHERE parent_id = ?2",
                params![now, id],
            )?;
            for child in &children {
                ctx.record_change(
                    "item",
                    child,
                    EventType::ParentChanged,
                    Some(id.to_string()),
                    None,
                );
            }

            tx.execute("DELETE FROM items WHERE id = ?1", [id])?;

            ctx.record_event("item", id, EventType::ItemDeleted);
            info!(id, edges, detached = children.len(), "Deleted item");
            Ok(())
        })
    }

    /// Write a single column plus `updated_at`, recording an update event.
    fn update_column(
        &mut self,
        op: &str,
        id: &str,
        column: &'static str,
        value: &dyn rusqlite::ToSql,
        actor: &str,
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();

        self.mutate(op, actor, |tx, ctx| {
            let rows = tx.execute(
                &format!("UPDATE items SET {column} = ?1, updated_at = ?2 WHERE id = ?3"),
                params![value, now, id],
            )?;
            if rows == 0 {
                return Err(not_found(tx, id)?);
            }

            ctx.events.push(
                Event::new("item", id, EventType::ItemUpdated, &ctx.actor).with_comment(column),
            );
            Ok(())
        })
    }

    // ==============
    // Log Operations
    // ==============

    /// Append a log entry to an item.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty message or `ItemNotFound`.
    pub fn add_log(&mut self, id: &str, message: &str, actor: &str) -> Result<Log> {
        let message = message.trim();
        if message.is_empty() {
            return Err(Error::InvalidArgument("log message cannot be empty".to_string()));
        }
        let now = chrono::Utc::now().timestamp_millis();

        self.mutate("add_log", actor, |tx, ctx| {
            require_item(tx, id)?;
            tx.execute(
                "INSERT INTO logs (item_id, message, created_at) VALUES (?1, ?2, ?3)",
                params![id, message, now],
            )?;
            let log_id = tx.last_insert_rowid();

            ctx.record_event("item", id, EventType::LogAdded);
            Ok(Log {
                id: log_id,
                item_id: id.to_string(),
                message: message.to_string(),
                created_at: now,
            })
        })
    }

    /// All log entries for an item, in the order they were written.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if the item does not exist.
    pub fn get_logs(&self, id: &str) -> Result<Vec<Log>> {
        require_item(&self.conn, id)?;

        let mut stmt = self.conn.prepare(
            "SELECT id, item_id, message, created_at FROM logs WHERE item_id = ?1 ORDER BY id ASC",
        )?;
        let logs = stmt
            .query_map([id], |row| {
                Ok(Log {
                    id: row.get(0)?,
                    item_id: row.get(1)?,
                    message: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    // ================
    // Label Operations
    // ================

    /// Attach a label to an item. Re-adding an existing label is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a blank label or `ItemNotFound`.
    pub fn add_label(&mut self, id: &str, name: &str, actor: &str) -> Result<()> {
        let name = validate_label(name)?;

        self.mutate("add_label", actor, |tx, ctx| {
            require_item(tx, id)?;
            let inserted = tx.execute(
                "INSERT OR IGNORE INTO labels (item_id, name) VALUES (?1, ?2)",
                params![id, name],
            )?;
            if inserted > 0 {
                ctx.record_change("item", id, EventType::LabelAdded, None, Some(name.to_string()));
            }
            Ok(())
        })
    }

    /// Detach a label from an item. Removing a missing label is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if the item does not exist.
    pub fn remove_label(&mut self, id: &str, name: &str, actor: &str) -> Result<()> {
        let name = name.trim();

        self.mutate("remove_label", actor, |tx, ctx| {
            require_item(tx, id)?;
            let removed = tx.execute(
                "DELETE FROM labels WHERE item_id = ?1 AND name = ?2",
                params![id, name],
            )?;
            if removed > 0 {
                ctx.record_change("item", id, EventType::LabelRemoved, Some(name.to_string()), None);
            }
            Ok(())
        })
    }

    /// Labels attached to an item, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if the item does not exist.
    pub fn get_labels(&self, id: &str) -> Result<Vec<String>> {
        require_item(&self.conn, id)?;
        load_labels(&self.conn, id)
    }

    // ==================
    // Project Operations
    // ==================

    /// All registered projects, by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, description, created_at, updated_at FROM projects ORDER BY name",
        )?;
        let projects = stmt
            .query_map([], |row| {
                Ok(Project {
                    name: row.get(0)?,
                    description: row.get(1)?,
                    created_at: row.get(2)?,
                    updated_at: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    // ================
    // Audit Operations
    // ================

    /// Recent audit events for an item, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_item_events(&self, id: &str, limit: Option<u32>) -> Result<Vec<Event>> {
        Ok(get_events(&self.conn, "item", id, limit)?)
    }
}

// =====================
// Row mapping & helpers
// =====================

/// An `items` row with enum columns still as text.
pub(crate) struct ItemRow {
    id: String,
    project: String,
    item_type: String,
    title: String,
    description: Option<String>,
    status: String,
    priority: i32,
    parent_id: Option<String>,
    created_at: i64,
    updated_at: i64,
    definition_of_done: Option<String>,
}

impl ItemRow {
    /// Read a row selected with [`ITEM_COLUMNS`].
    pub(crate) fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            project: row.get(1)?,
            item_type: row.get(2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            status: row.get(5)?,
            priority: row.get(6)?,
            parent_id: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
            definition_of_done: row.get(10)?,
        })
    }

    /// Parse the enum columns exactly. Unknown values are corruption, not
    /// user error.
    pub(crate) fn into_item(self) -> Result<Item> {
        let item_type = ItemType::parse(&self.item_type).ok_or_else(|| Error::CorruptValue {
            field: "type",
            value: self.item_type.clone(),
            id: self.id.clone(),
        })?;
        let status = Status::parse(&self.status).ok_or_else(|| Error::CorruptValue {
            field: "status",
            value: self.status.clone(),
            id: self.id.clone(),
        })?;

        Ok(Item {
            id: self.id,
            project: self.project,
            item_type,
            title: self.title,
            description: self.description,
            definition_of_done: self.definition_of_done,
            status,
            priority: self.priority,
            parent_id: self.parent_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            labels: Vec::new(),
        })
    }
}

/// Load one item with its stored status.
pub(crate) fn fetch_item(conn: &Connection, id: &str) -> Result<Option<Item>> {
    conn.query_row(
        &format!("SELECT {ITEM_COLUMNS} FROM items item WHERE item.id = ?1"),
        [id],
        ItemRow::from_row,
    )
    .optional()?
    .map(ItemRow::into_item)
    .transpose()
}

/// Load one item with its stored status, failing if it does not exist.
pub(crate) fn require_item(conn: &Connection, id: &str) -> Result<Item> {
    match fetch_item(conn, id)? {
        Some(item) => Ok(item),
        None => Err(not_found(conn, id)?),
    }
}

/// Build the not-found error for `id`, with close matches when there are any.
pub(crate) fn not_found(conn: &Connection, id: &str) -> Result<Error> {
    let similar = find_similar_ids(id, &all_item_ids(conn)?, 3);
    Ok(if similar.is_empty() {
        Error::ItemNotFound { id: id.to_string() }
    } else {
        Error::ItemNotFoundSimilar {
            id: id.to_string(),
            similar,
        }
    })
}

fn all_item_ids(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT id FROM items ORDER BY id")?;
    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(ids)
}

/// Count an epic's direct children by stored status.
///
/// The total comes from the same statement as the buckets so both see one
/// snapshot.
pub(crate) fn child_counts(conn: &Connection, epic_id: &str) -> Result<ChildCounts> {
    let mut stmt = conn.prepare(
        "SELECT status, COUNT(*), (SELECT COUNT(*) FROM items WHERE parent_id = ?1)
         FROM items
         WHERE parent_id = ?1
         GROUP BY status",
    )?;
    let rows = stmt
        .query_map([epic_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, usize>(1)?,
                row.get::<_, usize>(2)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut counts = ChildCounts::with_total(rows.first().map_or(0, |(_, _, total)| *total));
    for (raw, count, _) in rows {
        let status = Status::parse(&raw).ok_or_else(|| Error::CorruptValue {
            field: "status",
            value: raw.clone(),
            id: epic_id.to_string(),
        })?;
        counts.record(status, count);
    }
    Ok(counts)
}

/// The status an item reports: stored for tasks, derived for epics.
pub(crate) fn effective_status(conn: &Connection, item: &Item) -> Result<Status> {
    if item.item_type == ItemType::Task || item.status.is_terminal() {
        return Ok(item.status);
    }
    let counts = child_counts(conn, &item.id)?;
    derive_status(item.item_type, item.status, &counts)
}

/// Run an item query and apply effective statuses.
pub(crate) fn query_items(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<Item>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, ItemRow::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let mut item = row.into_item()?;
        item.status = effective_status(conn, &item)?;
        items.push(item);
    }
    Ok(items)
}

pub(crate) fn load_labels(conn: &Connection, id: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM labels WHERE item_id = ?1 ORDER BY name")?;
    let labels = stmt
        .query_map([id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(labels)
}

fn check_parent(conn: &Connection, id: &str, item_type: ItemType, parent_id: &str) -> Result<()> {
    if parent_id == id {
        return Err(Error::InvalidArgument(format!("{id} cannot be its own parent")));
    }
    let parent = require_item(conn, parent_id)?;
    if !parent.is_epic() {
        return Err(Error::InvalidParent {
            id: parent_id.to_string(),
            actual: parent.item_type.to_string(),
        });
    }
    if item_type == ItemType::Epic {
        warn!(
            id,
            parent = parent_id,
            "Nesting an epic under an epic: the parent only sees its direct children"
        );
    }
    Ok(())
}

fn ensure_project(
    tx: &Transaction,
    ctx: &mut MutationContext,
    project: &str,
    now: i64,
) -> Result<()> {
    if project.is_empty() {
        return Ok(());
    }
    let inserted = tx.execute(
        "INSERT OR IGNORE INTO projects (name, created_at, updated_at) VALUES (?1, ?2, ?2)",
        params![project, now],
    )?;
    if inserted > 0 {
        ctx.record_event("project", project, EventType::ProjectCreated);
        info!(project, "Registered project");
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::InvalidArgument("title cannot be empty".to_string()));
    }
    Ok(())
}

fn validate_priority(priority: i32) -> Result<()> {
    if (1..=3).contains(&priority) {
        Ok(())
    } else {
        Err(Error::InvalidPriority {
            value: priority.to_string(),
            suggestion: Some("Priority must be 1-3 (1=high, 3=low)".to_string()),
        })
    }
}

fn validate_label(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidArgument("label cannot be empty".to_string()));
    }
    Ok(name)
}
