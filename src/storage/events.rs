//! Append-only audit trail.
//!
//! Mutations queue [`Event`]s on their `MutationContext`; the queue is
//! flushed into the `events` table right before the transaction commits, so
//! a rolled-back change leaves no trace.

use rusqlite::{params, Connection, Result, Row};
use serde::Serialize;

/// What happened to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ItemCreated,
    ItemUpdated,
    StatusChanged,
    ParentChanged,
    ItemDeleted,
    DepAdded,
    DepRemoved,
    LogAdded,
    LabelAdded,
    LabelRemoved,
    ProjectCreated,
}

/// Stored spelling of each event type, in declaration order.
const EVENT_NAMES: [(EventType, &str); 11] = [
    (EventType::ItemCreated, "item_created"),
    (EventType::ItemUpdated, "item_updated"),
    (EventType::StatusChanged, "status_changed"),
    (EventType::ParentChanged, "parent_changed"),
    (EventType::ItemDeleted, "item_deleted"),
    (EventType::DepAdded, "dep_added"),
    (EventType::DepRemoved, "dep_removed"),
    (EventType::LogAdded, "log_added"),
    (EventType::LabelAdded, "label_added"),
    (EventType::LabelRemoved, "label_removed"),
    (EventType::ProjectCreated, "project_created"),
];

impl EventType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        EVENT_NAMES
            .iter()
            .find(|(kind, _)| *kind == self)
            .map_or("unknown", |(_, name)| *name)
    }

    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        EVENT_NAMES
            .iter()
            .find(|(_, stored)| *stored == name)
            .map(|(kind, _)| *kind)
    }
}

/// One row of the audit trail. `id` is zero until the row is stored.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: i64,
    pub entity_type: String,
    pub entity_id: String,
    pub event_type: EventType,
    pub actor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: i64,
}

impl Event {
    #[must_use]
    pub fn new(entity_type: &str, entity_id: &str, event_type: EventType, actor: &str) -> Self {
        Self {
            id: 0,
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            event_type,
            actor: actor.into(),
            old_value: None,
            new_value: None,
            comment: None,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Attach the before and after values of a changed field.
    #[must_use]
    pub fn with_values(self, old_value: Option<String>, new_value: Option<String>) -> Self {
        Self {
            old_value,
            new_value,
            ..self
        }
    }

    /// Attach a free-form note, typically the name of the edited column.
    #[must_use]
    pub fn with_comment(self, comment: &str) -> Self {
        Self {
            comment: Some(comment.into()),
            ..self
        }
    }

    /// Decode a row selected with [`EVENT_COLUMNS`]. Unknown kinds yield `None`.
    fn from_row(row: &Row<'_>) -> Result<Option<Self>> {
        let kind: String = row.get("event_type")?;
        let Some(event_type) = EventType::parse(&kind) else {
            return Ok(None);
        };
        Ok(Some(Self {
            id: row.get("id")?,
            entity_type: row.get("entity_type")?,
            entity_id: row.get("entity_id")?,
            event_type,
            actor: row.get("actor")?,
            old_value: row.get("old_value")?,
            new_value: row.get("new_value")?,
            comment: row.get("comment")?,
            created_at: row.get("created_at")?,
        }))
    }
}

const EVENT_COLUMNS: &str =
    "id, entity_type, entity_id, event_type, actor, old_value, new_value, comment, created_at";

const DEFAULT_EVENT_LIMIT: u32 = 100;

/// Write one event and return its row id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_event(conn: &Connection, event: &Event) -> Result<i64> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO events (entity_type, entity_id, event_type, actor, old_value, new_value, comment, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    stmt.insert(params![
        event.entity_type,
        event.entity_id,
        event.event_type.as_str(),
        event.actor,
        event.old_value,
        event.new_value,
        event.comment,
        event.created_at,
    ])
}

/// Events for one entity, newest first, capped at `limit` (default 100).
///
/// Rows written by a newer binary with an event kind this one does not know
/// are dropped rather than failing the read.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_events(
    conn: &Connection,
    entity_type: &str,
    entity_id: &str,
    limit: Option<u32>,
) -> Result<Vec<Event>> {
    let sql = format!(
        "SELECT {EVENT_COLUMNS} FROM events
         WHERE entity_type = ?1 AND entity_id = ?2
         ORDER BY created_at DESC, id DESC
         LIMIT ?3"
    );
    let mut stmt = conn.prepare(&sql)?;
    let limit = limit.unwrap_or(DEFAULT_EVENT_LIMIT);

    stmt.query_map(params![entity_type, entity_id, limit], Event::from_row)?
        .filter_map(Result::transpose)
        .collect()
}
