//! Versioned data migrations run after the base DDL.
//!
//! The base schema is written with `CREATE ... IF NOT EXISTS`, so it only
//! covers brand-new databases. Changes to existing files go here, each under a
//! name recorded in `schema_migrations` once it has run.

use rusqlite::{params, Connection, OptionalExtension, Result};
use tracing::{debug, info};

/// Ordered list of `(name, batch)`. Never edit or reorder a shipped entry.
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "001_backfill_projects",
        "INSERT OR IGNORE INTO projects (name, created_at, updated_at)
         SELECT project, MIN(created_at), MAX(updated_at)
         FROM items
         WHERE project != ''
         GROUP BY project;",
    ),
    (
        "002_drop_orphan_deps",
        "DELETE FROM deps
         WHERE item_id NOT IN (SELECT id FROM items)
            OR depends_on NOT IN (SELECT id FROM items);",
    ),
    (
        "003_deps_created_at",
        "ALTER TABLE deps ADD COLUMN created_at INTEGER NOT NULL DEFAULT 0;",
    ),
    (
        "004_items_definition_of_done",
        "ALTER TABLE items ADD COLUMN definition_of_done TEXT;",
    ),
];

/// Apply every migration not yet recorded, each in its own transaction.
///
/// A column the base DDL already created makes an `ALTER TABLE` fail with
/// "duplicate column name"; that migration is recorded as done.
///
/// # Errors
///
/// Returns the first SQL error that is not a duplicate column.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version TEXT PRIMARY KEY,
            applied_at INTEGER NOT NULL
        );",
    )?;

    let pending = MIGRATIONS
        .iter()
        .filter_map(|&(name, batch)| match is_recorded(conn, name) {
            Ok(true) => None,
            Ok(false) => Some(Ok((name, batch))),
            Err(e) => Some(Err(e)),
        })
        .collect::<Result<Vec<_>>>()?;

    for (name, batch) in pending {
        let tx = conn.unchecked_transaction()?;
        match tx.execute_batch(batch) {
            Ok(()) => info!(migration = name, "Applied migration"),
            Err(e) if is_duplicate_column(&e) => {
                debug!(migration = name, "Column already present, recording as applied");
            }
            Err(e) => return Err(e),
        }
        tx.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
            params![name, chrono::Utc::now().timestamp_millis()],
        )?;
        tx.commit()?;
    }

    Ok(())
}

fn is_recorded(conn: &Connection, name: &str) -> Result<bool> {
    conn.query_row(
        "SELECT 1 FROM schema_migrations WHERE version = ?1",
        [name],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
}

fn is_duplicate_column(err: &rusqlite::Error) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("duplicate column name"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::SCHEMA_SQL;

    fn fresh() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
        conn
    }

    fn recorded(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect()
    }

    #[test]
    fn test_every_migration_recorded_once() {
        let conn = fresh();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let names: Vec<&str> = MIGRATIONS.iter().map(|(name, _)| *name).collect();
        assert_eq!(recorded(&conn), names);
    }

    #[test]
    fn test_existing_column_does_not_fail() {
        let conn = fresh();
        // the base DDL already has deps.created_at
        run_migrations(&conn).unwrap();
        assert!(is_recorded(&conn, "003_deps_created_at").unwrap());
    }

    #[test]
    fn test_definition_of_done_added_to_old_items_table() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE items (
                 id TEXT PRIMARY KEY, project TEXT NOT NULL DEFAULT '', type TEXT NOT NULL,
                 title TEXT NOT NULL, description TEXT, status TEXT NOT NULL DEFAULT 'open',
                 priority INTEGER NOT NULL DEFAULT 2, parent_id TEXT,
                 created_at INTEGER NOT NULL, updated_at INTEGER NOT NULL);
             INSERT INTO items (id, type, title, created_at, updated_at)
             VALUES ('ts-000001', 'task', 'Old', 1, 1);",
        )
        .unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();

        run_migrations(&conn).unwrap();

        let dod: Option<String> = conn
            .query_row(
                "SELECT definition_of_done FROM items WHERE id = 'ts-000001'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(dod, None);
    }

    #[test]
    fn test_orphan_edges_are_dropped() {
        let conn = fresh();
        conn.execute_batch(
            "PRAGMA foreign_keys = OFF;
             INSERT INTO items (id, project, type, title, created_at, updated_at)
             VALUES ('ts-000001', 'p', 'task', 'A', 1, 1);
             INSERT INTO deps (item_id, depends_on, created_at) VALUES ('ts-000001', 'ts-gone00', 1);",
        )
        .unwrap();

        run_migrations(&conn).unwrap();

        let edges: i64 = conn
            .query_row("SELECT COUNT(*) FROM deps", [], |row| row.get(0))
            .unwrap();
        assert_eq!(edges, 0);
    }

    #[test]
    fn test_projects_backfilled_from_items() {
        let conn = fresh();
        conn.execute_batch(
            "INSERT INTO items (id, project, type, title, created_at, updated_at)
             VALUES ('ts-000001', 'alpha', 'task', 'A', 10, 20),
                    ('ts-000002', 'alpha', 'task', 'B', 5, 30),
                    ('ts-000003', '', 'task', 'C', 1, 1);",
        )
        .unwrap();

        run_migrations(&conn).unwrap();

        let (name, created, updated): (String, i64, i64) = conn
            .query_row(
                "SELECT name, created_at, updated_at FROM projects",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!((name.as_str(), created, updated), ("alpha", 5, 30));
    }
}
