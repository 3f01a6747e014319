//! Dependency graph storage.
//!
//! An edge `(item_id, depends_on)` means `item_id` cannot be ready until
//! `depends_on` is resolved. Edges are deduplicated by the table's primary
//! key and the graph is kept acyclic at insertion time.
//!
//! An epic also waits on its task children: it resolves only once they are
//! closed. Cycle checks walk both kinds of edge, so a task cannot depend on
//! the epic that contains it.

use crate::error::{Error, Result};
use crate::model::Status;
use crate::storage::events::EventType;
use crate::storage::sqlite::{effective_status, fetch_item, require_item, SqliteStorage};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info};

/// A dependency edge with both endpoints' titles and effective statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepEdge {
    pub item_id: String,
    pub item_title: String,
    pub item_status: Status,
    pub depends_on: String,
    pub depends_on_title: String,
    pub depends_on_status: Status,
}

impl SqliteStorage {
    /// Record that `item_id` depends on `depends_on`.
    ///
    /// Adding an edge that already exists is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if either endpoint is missing and
    /// `CycleDetected` for a self-edge, an edge that would close a cycle, or
    /// a task depending on an epic it belongs to.
    pub fn add_dependency(&mut self, item_id: &str, depends_on: &str, actor: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();

        self.mutate("add_dependency", actor, |tx, ctx| {
            require_item(tx, item_id)?;
            require_item(tx, depends_on)?;

            if waits_on(tx, depends_on, item_id)? {
                return Err(Error::CycleDetected {
                    item_id: item_id.to_string(),
                    depends_on: depends_on.to_string(),
                });
            }

            let inserted = tx.execute(
                "INSERT OR IGNORE INTO deps (item_id, depends_on, created_at) VALUES (?1, ?2, ?3)",
                params![item_id, depends_on, now],
            )?;

            if inserted > 0 {
                ctx.record_change(
                    "item",
                    item_id,
                    EventType::DepAdded,
                    None,
                    Some(depends_on.to_string()),
                );
                info!(item_id, depends_on, "Added dependency");
            } else {
                debug!(item_id, depends_on, "Dependency already present");
            }
            Ok(())
        })
    }

    /// Remove an edge. Removing a missing edge is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn remove_dependency(&mut self, item_id: &str, depends_on: &str, actor: &str) -> Result<()> {
        self.mutate("remove_dependency", actor, |tx, ctx| {
            let removed = tx.execute(
                "DELETE FROM deps WHERE item_id = ?1 AND depends_on = ?2",
                params![item_id, depends_on],
            )?;
            if removed > 0 {
                ctx.record_change(
                    "item",
                    item_id,
                    EventType::DepRemoved,
                    Some(depends_on.to_string()),
                    None,
                );
            }
            Ok(())
        })
    }

    /// IDs that `item_id` depends on.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_dependencies(&self, item_id: &str) -> Result<Vec<String>> {
        collect_ids(
            self.conn(),
            "SELECT depends_on FROM deps WHERE item_id = ?1 ORDER BY created_at, depends_on",
            item_id,
        )
    }

    /// IDs that depend on `target`, i.e. what `target` blocks.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_dependents(&self, target: &str) -> Result<Vec<String>> {
        collect_ids(
            self.conn(),
            "SELECT item_id FROM deps WHERE depends_on = ?1 ORDER BY created_at, item_id",
            target,
        )
    }

    /// Every edge whose dependent item is in `project` (all edges when
    /// `project` is `None`), with effective statuses on both ends.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored value is corrupt.
    pub fn get_all_dependencies(&self, project: Option<&str>) -> Result<Vec<DepEdge>> {
        let conn = self.conn();
        let mut sql = String::from(
            "SELECT d.item_id, d.depends_on
             FROM deps d
             JOIN items i ON i.id = d.item_id",
        );
        if project.is_some() {
            sql.push_str(" WHERE i.project = ?1");
        }
        sql.push_str(" ORDER BY i.priority, i.id, d.depends_on");

        let mut stmt = conn.prepare(&sql)?;
        let map = |row: &rusqlite::Row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?));
        let pairs = match project {
            Some(p) => stmt.query_map([p], map)?.collect::<std::result::Result<Vec<_>, _>>()?,
            None => stmt.query_map([], map)?.collect::<std::result::Result<Vec<_>, _>>()?,
        };

        let mut edges = Vec::with_capacity(pairs.len());
        for (item_id, depends_on) in pairs {
            let (item_title, item_status) = endpoint(conn, &item_id)?;
            let (depends_on_title, depends_on_status) = endpoint(conn, &depends_on)?;
            edges.push(DepEdge {
                item_id,
                item_title,
                item_status,
                depends_on,
                depends_on_title,
                depends_on_status,
            });
        }
        Ok(edges)
    }
}

/// Whether `from` cannot resolve before `to` does, following dependency
/// edges and epic-to-task-child containment. An item waits on itself.
pub(crate) fn waits_on(conn: &Connection, from: &str, to: &str) -> Result<bool> {
    let found = conn
        .query_row(
            "WITH RECURSIVE
             waits(waiter, target) AS (
                 SELECT item_id, depends_on FROM deps
                 UNION ALL
                 SELECT parent_id, id FROM items
                 WHERE parent_id IS NOT NULL AND type = 'task'
             ),
             reachable(id) AS (
                 SELECT ?1
                 UNION
                 SELECT w.target FROM waits w JOIN reachable r ON w.waiter = r.id
             )
             SELECT 1 FROM reachable WHERE id = ?2 LIMIT 1",
            params![from, to],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn collect_ids(conn: &Connection, sql: &str, id: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let ids = stmt
        .query_map([id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(ids)
}

fn endpoint(conn: &Connection, id: &str) -> Result<(String, Status)> {
    let item = fetch_item(conn, id)?.ok_or_else(|| {
        Error::InvariantViolation(format!("dependency edge points at missing item {id}"))
    })?;
    let status = effective_status(conn, &item)?;
    Ok((item.title, status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sqlite::tests::{child, epic, task};

    #[test]
    fn test_add_and_query_both_directions() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let a = task(&mut storage, "", "a");
        let b = task(&mut storage, "", "b");
        let c = task(&mut storage, "", "c");

        storage.add_dependency(&a.id, &b.id, "test").unwrap();
        storage.add_dependency(&a.id, &c.id, "test").unwrap();

        let mut deps = storage.get_dependencies(&a.id).unwrap();
        deps.sort();
        let mut expected = vec![b.id.clone(), c.id.clone()];
        expected.sort();
        assert_eq!(deps, expected);
        assert_eq!(storage.get_dependents(&b.id).unwrap(), vec![a.id.clone()]);
        assert!(storage.get_dependents(&a.id).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_edge_is_idempotent() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let a = task(&mut storage, "", "a");
        let b = task(&mut storage, "", "b");

        storage.add_dependency(&a.id, &b.id, "test").unwrap();
        storage.add_dependency(&a.id, &b.id, "test").unwrap();

        assert_eq!(storage.get_dependencies(&a.id).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_endpoint_is_not_found() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let a = task(&mut storage, "", "a");

        let err = storage.add_dependency(&a.id, "ts-zzzzzz", "test").unwrap_err();
        assert_eq!(err.exit_code(), 3);
        let err = storage.add_dependency("ts-zzzzzz", &a.id, "test").unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_cycles_are_rejected() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let a = task(&mut storage, "", "a");
        let b = task(&mut storage, "", "b");
        let c = task(&mut storage, "", "c");

        assert!(matches!(
            storage.add_dependency(&a.id, &a.id, "test"),
            Err(Error::CycleDetected { .. })
        ));

        storage.add_dependency(&a.id, &b.id, "test").unwrap();
        storage.add_dependency(&b.id, &c.id, "test").unwrap();

        let err = storage.add_dependency(&c.id, &a.id, "test").unwrap_err();
        assert!(matches!(err, Error::CycleDetected { .. }));
        assert_eq!(err.exit_code(), 5);
        assert!(storage.get_dependencies(&c.id).unwrap().is_empty());

        // Diamonds are fine
        storage.add_dependency(&a.id, &c.id, "test").unwrap();
    }

    #[test]
    fn test_task_cannot_depend_on_its_own_epic() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let e = epic(&mut storage, "", "e");
        let c = child(&mut storage, &e, Status::Open);
        let after = task(&mut storage, "", "after");
        storage.add_dependency(&after.id, &c.id, "test").unwrap();

        let err = storage.add_dependency(&c.id, &e.id, "test").unwrap_err();
        assert!(matches!(err, Error::CycleDetected { .. }));
        assert!(storage.get_dependencies(&c.id).unwrap().is_empty());

        // after -> e -> c, so c may not wait on after
        storage.add_dependency(&after.id, &e.id, "test").unwrap();
        let err = storage.add_dependency(&c.id, &after.id, "test").unwrap_err();
        assert_eq!(err.exit_code(), 5);

        // the epic itself may wait on its child
        storage.add_dependency(&e.id, &c.id, "test").unwrap();
    }

    #[test]
    fn test_grandchild_may_depend_on_outer_epic() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let outer = epic(&mut storage, "", "outer");
        let inner = epic(&mut storage, "", "inner");
        storage.set_parent(&inner.id, Some(&outer.id), "test").unwrap();
        let leaf = child(&mut storage, &inner, Status::Open);

        // outer only reads inner's stored status, which is closed by hand
        storage.add_dependency(&leaf.id, &outer.id, "test").unwrap();
    }

    #[test]
    fn test_remove_dependency() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let a = task(&mut storage, "", "a");
        let b = task(&mut storage, "", "b");

        storage.add_dependency(&a.id, &b.id, "test").unwrap();
        storage.remove_dependency(&a.id, &b.id, "test").unwrap();
        storage.remove_dependency(&a.id, &b.id, "test").unwrap();

        assert!(storage.get_dependencies(&a.id).unwrap().is_empty());
    }

    #[test]
    fn test_all_dependencies_use_effective_status() {
        let mut storage = SqliteStorage::open_memory().unwrap();
        let e = epic(&mut storage, "proj", "epic");
        child(&mut storage, &e, Status::Done);
        let t = task(&mut storage, "proj", "after epic");
        let elsewhere = task(&mut storage, "other", "x");
        storage.add_dependency(&t.id, &e.id, "test").unwrap();
        storage.add_dependency(&elsewhere.id, &t.id, "test").unwrap();

        let edges = storage.get_all_dependencies(Some("proj")).unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].item_id, t.id);
        assert_eq!(edges[0].item_status, Status::Open);
        assert_eq!(edges[0].depends_on_title, "epic");
        assert_eq!(edges[0].depends_on_status, Status::Done);

        assert_eq!(storage.get_all_dependencies(None).unwrap().len(), 2);
    }
}
