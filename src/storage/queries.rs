//! Read-side queries over items and the dependency graph.
//!
//! Anything that asks "is this blocked" goes through
//! [`DEP_UNRESOLVED_SQL`], and anything that reports a status goes through
//! the derivation engine. Nothing here is cached.

use crate::engine::DEP_UNRESOLVED_SQL;
use crate::error::{Error, Result};
use crate::model::{Item, ItemType, Status};
use crate::storage::sqlite::{
    effective_status, query_items, require_item, SqliteStorage, ITEM_COLUMNS,
};
use serde::Serialize;

/// Filters for [`SqliteStorage::list_items`]. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub project: Option<String>,
    /// Matched against effective status.
    pub status: Option<Status>,
    pub item_type: Option<ItemType>,
    /// Direct children of this epic.
    pub parent: Option<String>,
    /// Items this ID depends on (what is blocking it).
    pub blocking: Option<String>,
    /// Items that depend on this ID (what it blocks).
    pub blocked_by: Option<String>,
    /// Only items with at least one unresolved dependency.
    pub has_blockers: bool,
    /// Only items with no unresolved dependency.
    pub no_blockers: bool,
    /// Items carrying every one of these labels.
    pub labels: Vec<String>,
    pub limit: Option<usize>,
}

/// Aggregated project state, counted by effective status.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusReport {
    pub project: Option<String>,
    pub open: usize,
    pub in_progress: usize,
    pub blocked: usize,
    pub reviewing: usize,
    pub done: usize,
    pub canceled: usize,
    pub ready: usize,
    pub ready_items: Vec<Item>,
    pub in_progress_items: Vec<Item>,
    pub reviewing_items: Vec<Item>,
    pub blocked_items: Vec<Item>,
    /// Last three items to reach done, newest first.
    pub recent_done: Vec<Item>,
}

impl StatusReport {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.open + self.in_progress + self.blocked + self.reviewing + self.done + self.canceled
    }
}

/// Correlated "has an unresolved dependency" test for the row aliased `item`.
fn unmet_deps_clause() -> String {
    format!(
        "EXISTS (
            SELECT 1 FROM deps d
            JOIN items i ON i.id = d.depends_on
            WHERE d.item_id = item.id AND {DEP_UNRESOLVED_SQL}
        )"
    )
}

impl SqliteStorage {
    /// Effective status of one item.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound`, or an internal error on corrupt data.
    pub fn get_effective_status(&self, id: &str) -> Result<Status> {
        let item = require_item(self.conn(), id)?;
        effective_status(self.conn(), &item)
    }

    /// Whether any dependency of `id` is unresolved.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if the item does not exist.
    pub fn has_unmet_dependencies(&self, id: &str) -> Result<bool> {
        require_item(self.conn(), id)?;
        let count: i64 = self.conn().query_row(
            &format!(
                "SELECT COUNT(*) FROM deps d
                 JOIN items i ON i.id = d.depends_on
                 WHERE d.item_id = ?1 AND {DEP_UNRESOLVED_SQL}"
            ),
            [id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// The unresolved dependencies of `id`, with effective statuses.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if the item does not exist.
    pub fn get_blockers(&self, id: &str) -> Result<Vec<Item>> {
        require_item(self.conn(), id)?;
        query_items(
            self.conn(),
            &format!(
                "SELECT {ITEM_COLUMNS} FROM items item
                 WHERE item.id IN (
                     SELECT d.depends_on FROM deps d
                     JOIN items i ON i.id = d.depends_on
                     WHERE d.item_id = ?1 AND {DEP_UNRESOLVED_SQL}
                 )
                 ORDER BY item.priority ASC, item.created_at ASC"
            ),
            &[&id],
        )
    }

    /// Tasks that can be picked up now: stored status open, no unresolved
    /// dependency, and carrying every label in `labels`.
    ///
    /// Ordered by priority, then age.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value is corrupt.
    pub fn list_ready(&self, project: Option<&str>, labels: &[String]) -> Result<Vec<Item>> {
        let mut sql = format!(
            "SELECT {ITEM_COLUMNS} FROM items item
             WHERE item.type = 'task'
               AND item.status = 'open'
               AND NOT {}",
            unmet_deps_clause()
        );
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(p) = project {
            sql.push_str(" AND item.project = ?");
            params.push(Box::new(p.to_string()));
        }
        push_label_filters(&mut sql, &mut params, labels);
        sql.push_str(" ORDER BY item.priority ASC, item.created_at ASC");

        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(AsRef::as_ref).collect();
        query_items(self.conn(), &sql, &params_refs)
    }

    /// List items matching `filter`, ordered by priority then age.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when both `has_blockers` and `no_blockers`
    /// are set.
    pub fn list_items(&self, filter: &ListFilter) -> Result<Vec<Item>> {
        if filter.has_blockers && filter.no_blockers {
            return Err(Error::InvalidArgument(
                "--has-blockers and --no-blockers are mutually exclusive".to_string(),
            ));
        }

        let mut sql = format!("SELECT {ITEM_COLUMNS} FROM items item WHERE 1=1");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(p) = &filter.project {
            sql.push_str(" AND item.project = ?");
            params.push(Box::new(p.clone()));
        }
        if let Some(t) = filter.item_type {
            sql.push_str(" AND item.type = ?");
            params.push(Box::new(t.as_str()));
        }
        if let Some(parent) = &filter.parent {
            sql.push_str(" AND item.parent_id = ?");
            params.push(Box::new(parent.clone()));
        }
        if let Some(id) = &filter.blocking {
            sql.push_str(" AND item.id IN (SELECT depends_on FROM deps WHERE item_id = ?)");
            params.push(Box::new(id.clone()));
        }
        if let Some(id) = &filter.blocked_by {
            sql.push_str(" AND item.id IN (SELECT item_id FROM deps WHERE depends_on = ?)");
            params.push(Box::new(id.clone()));
        }
        if filter.has_blockers {
            sql.push_str(&format!(" AND {}", unmet_deps_clause()));
        }
        if filter.no_blockers {
            sql.push_str(&format!(" AND NOT {}", unmet_deps_clause()));
        }
        push_label_filters(&mut sql, &mut params, &filter.labels);
        sql.push_str(" ORDER BY item.priority ASC, item.created_at ASC");

        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(AsRef::as_ref).collect();
        let items = query_items(self.conn(), &sql, &params_refs)?;

        // Status is effective, so it is filtered after derivation.
        let items = items
            .into_iter()
            .filter(|item| filter.status.is_none_or(|s| item.status == s))
            .take(filter.limit.unwrap_or(usize::MAX))
            .collect();
        Ok(items)
    }

    /// Status overview for a project (or everything, with `None`).
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails or a stored value is corrupt.
    pub fn project_status_report(&self, project: Option<&str>) -> Result<StatusReport> {
        let items = self.list_items(&ListFilter {
            project: project.map(str::to_string),
            ..ListFilter::default()
        })?;

        let mut report = StatusReport {
            project: project.map(str::to_string),
            ..StatusReport::default()
        };
        let mut done = Vec::new();

        for item in items {
            match item.status {
                Status::Open => report.open += 1,
                Status::InProgress => {
                    report.in_progress += 1;
                    report.in_progress_items.push(item);
                }
                Status::Blocked => {
                    report.blocked += 1;
                    report.blocked_items.push(item);
                }
                Status::Reviewing => {
                    report.reviewing += 1;
                    report.reviewing_items.push(item);
                }
                Status::Done => {
                    report.done += 1;
                    done.push(item);
                }
                Status::Canceled => report.canceled += 1,
            }
        }

        done.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        done.truncate(3);
        report.recent_done = done;

        report.ready_items = self.list_ready(project, &[])?;
        report.ready = report.ready_items.len();

        Ok(report)
    }
}

fn push_label_filters(
    sql: &mut String,
    params: &mut Vec<Box<dyn rusqlite::ToSql>>,
    labels: &[String],
) {
    for label in labels {
        sql.push_str(
            " AND EXISTS (SELECT 1 FROM labels l WHERE l.item_id = item.id AND l.name = ?)",
        );
        params.push(Box::new(label.clone()));
    }
}
