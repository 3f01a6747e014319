//! Item model for prog.
//!
//! Items are the unit of work: either a leaf task or an epic that groups
//! child tasks. Only the stored status lives on disk; epics report an
//! effective status computed by [`crate::engine`].

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of item. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Task,
    Epic,
}

impl ItemType {
    /// All kinds, in display order.
    pub const ALL: [Self; 2] = [Self::Task, Self::Epic];

    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Epic => "epic",
        }
    }

    /// ID prefix for newly generated items of this kind.
    #[must_use]
    pub const fn id_prefix(&self) -> &'static str {
        match self {
            Self::Task => "ts",
            Self::Epic => "ep",
        }
    }

    /// Exact, case-sensitive parse of a stored value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = Error;

    /// Lenient parse for user input: exact match, then synonyms.
    fn from_str(s: &str) -> Result<Self> {
        let canonical = crate::validate::normalize_type(s).map_err(|(value, suggestion)| {
            Error::InvalidType { value, suggestion }
        })?;
        Self::parse(&canonical).ok_or(Error::InvalidType {
            value: s.to_string(),
            suggestion: None,
        })
    }
}

/// Item status.
///
/// `Done` and `Canceled` are terminal. On an epic, a stored terminal status
/// is a manual override that wins over anything derived from children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Open,
    InProgress,
    Blocked,
    Reviewing,
    Done,
    Canceled,
}

impl Status {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Open,
        Self::InProgress,
        Self::Blocked,
        Self::Reviewing,
        Self::Done,
        Self::Canceled,
    ];

    /// Get the string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Reviewing => "reviewing",
            Self::Done => "done",
            Self::Canceled => "canceled",
        }
    }

    /// Exact, case-sensitive parse of a stored value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.as_str() == s)
    }

    /// Whether this status resolves a dependency on its own.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Canceled)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    /// Lenient parse for user input: exact match, then synonyms.
    fn from_str(s: &str) -> Result<Self> {
        let canonical = crate::validate::normalize_status(s).map_err(|(value, suggestion)| {
            Error::InvalidStatus { value, suggestion }
        })?;
        Self::parse(&canonical).ok_or(Error::InvalidStatus {
            value: s.to_string(),
            suggestion: None,
        })
    }
}

/// Default priority for new items (1 = high, 3 = low).
pub const DEFAULT_PRIORITY: i32 = 2;

/// A task or epic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier (`ts-xxxxxx` / `ep-xxxxxx`)
    pub id: String,

    /// Project scope; empty string means unscoped
    pub project: String,

    /// Task or epic
    #[serde(rename = "type")]
    pub item_type: ItemType,

    pub title: String,

    pub description: Option<String>,

    /// Acceptance criteria the item is checked against before closing
    pub definition_of_done: Option<String>,

    /// Stored status for tasks, effective status for epics once read
    /// through the store.
    pub status: Status,

    /// 1 = high, 2 = medium, 3 = low
    pub priority: i32,

    /// Owning epic, if any
    pub parent_id: Option<String>,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,

    /// Attached labels (only filled by queries that ask for them)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

impl Item {
    /// Create a new open item with a fresh ID.
    pub fn new(item_type: ItemType, project: impl Into<String>, title: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: generate_id(item_type),
            project: project.into(),
            item_type,
            title: title.into(),
            description: None,
            definition_of_done: None,
            status: Status::Open,
            priority: DEFAULT_PRIORITY,
            parent_id: None,
            created_at: now,
            updated_at: now,
            labels: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_epic(&self) -> bool {
        self.item_type == ItemType::Epic
    }
}

/// A log entry attached to an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    pub id: i64,
    pub item_id: String,
    pub message: String,
    pub created_at: i64,
}

/// Generate an item ID: kind prefix plus 6 lowercase hex chars.
#[must_use]
pub fn generate_id(item_type: ItemType) -> String {
    let bytes = uuid::Uuid::new_v4().into_bytes();
    format!(
        "{}-{:02x}{:02x}{:02x}",
        item_type.id_prefix(),
        bytes[0],
        bytes[1],
        bytes[2]
    )
}
