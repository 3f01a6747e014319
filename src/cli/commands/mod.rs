//! Command implementations.

pub mod completions;
pub mod dep;
pub mod history;
pub mod init;
pub mod item;
pub mod label;
pub mod list;
pub mod output;
pub mod projects;
pub mod status;
pub mod transition;
pub mod version;

use crate::config::{require_db_path, resolve_actor, resolve_project};
use crate::error::{Error, Result};
use crate::storage::SqliteStorage;
use std::path::Path;

/// Global flags every command handler needs.
#[derive(Debug, Clone, Default)]
pub struct Globals<'a> {
    pub db: Option<&'a Path>,
    pub project: Option<String>,
    pub actor: Option<&'a str>,
    pub json: bool,
}

impl<'a> Globals<'a> {
    #[must_use]
    pub fn new(
        db: Option<&'a Path>,
        project: Option<&str>,
        actor: Option<&'a str>,
        json: bool,
    ) -> Self {
        Self {
            db,
            project: resolve_project(project),
            actor,
            json,
        }
    }

    /// Open the database, which must already exist.
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` if `prog init` has not been run.
    pub fn open(&self) -> Result<SqliteStorage> {
        let path = require_db_path(self.db)?;
        SqliteStorage::open(&path)
    }

    #[must_use]
    pub fn actor(&self) -> String {
        resolve_actor(self.actor)
    }

    /// Project for new items; unscoped when no project is set.
    #[must_use]
    pub fn project_or_default(&self) -> &str {
        self.project.as_deref().unwrap_or("")
    }
}

/// Parse a user-supplied priority (digits, `P1`-`P3`, or names).
pub(crate) fn parse_priority(input: &str) -> Result<i32> {
    crate::validate::normalize_priority(input)
        .map_err(|(value, suggestion)| Error::InvalidPriority { value, suggestion })
}
