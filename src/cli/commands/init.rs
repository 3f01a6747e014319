//! Initialize the prog database.
//!
//! Creates `~/.prog/prog.db` (or the `--db` / `PROG_DB` path, or the test
//! database under `PROG_TEST_DB`) and applies the schema.

use crate::config::resolve_db_path;
use crate::error::{Error, Result};
use crate::storage::SqliteStorage;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Serialize)]
struct InitOutput {
    database: PathBuf,
    reinitialized: bool,
}

/// Execute the init command.
///
/// # Errors
///
/// Returns `AlreadyInitialized` if the database exists and `force` is not
/// set, or an error if the directory or database cannot be created.
pub fn execute(db: Option<&Path>, force: bool, json: bool) -> Result<()> {
    let db_path = resolve_db_path(db)
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

    let existed = db_path.exists();
    if existed && !force {
        return Err(Error::AlreadyInitialized { path: db_path });
    }

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    if existed {
        fs::remove_file(&db_path)?;
        for suffix in ["-wal", "-shm"] {
            let sidecar = sidecar_path(&db_path, suffix);
            if sidecar.exists() {
                fs::remove_file(sidecar)?;
            }
        }
    }

    SqliteStorage::open(&db_path)?;
    info!(path = %db_path.display(), "Initialized database");

    if json {
        let output = InitOutput {
            database: db_path,
            reinitialized: existed,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Initialized prog database");
        println!("  Database: {}", db_path.display());
        println!();
        println!("Next: prog add \"First task\" -p <project>");
    }

    Ok(())
}

fn sidecar_path(db_path: &Path, suffix: &str) -> PathBuf {
    let mut name = db_path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
