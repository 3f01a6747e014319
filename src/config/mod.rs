//! Configuration management.
//!
//! prog keeps one database per user at `~/.prog/prog.db`. Items are scoped by
//! project name inside that database rather than by directory, so any working
//! directory sees the same data.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment variable that redirects to an isolated test database.
pub const TEST_DB_ENV: &str = "PROG_TEST_DB";

/// Environment variable naming the actor recorded on audit events.
pub const ACTOR_ENV: &str = "PROG_ACTOR";

/// Get the global prog directory location (`~/.prog/`).
#[must_use]
pub fn global_prog_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".prog"))
}

/// Check if test mode is enabled.
///
/// Test mode is enabled by setting `PROG_TEST_DB=1` (or any non-empty value
/// other than `0` / `false`).
#[must_use]
pub fn is_test_mode() -> bool {
    std::env::var(TEST_DB_ENV).is_ok_and(|v| is_truthy(&v))
}

fn is_truthy(value: &str) -> bool {
    !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
}

/// Get the test database path (`~/.prog/test/prog.db`).
#[must_use]
pub fn test_db_path() -> Option<PathBuf> {
    global_prog_dir().map(|dir| dir.join("test").join("prog.db"))
}

/// Resolve the database path.
///
/// Priority:
/// 1. `explicit_path` (the `--db` flag, which clap also fills from `PROG_DB`)
/// 2. `PROG_TEST_DB` → `~/.prog/test/prog.db`
/// 3. `~/.prog/prog.db`
///
/// Returns `None` only when no home directory can be determined.
#[must_use]
pub fn resolve_db_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }

    if is_test_mode() {
        return test_db_path();
    }

    global_prog_dir().map(|dir| dir.join("prog.db"))
}

/// Resolve the database path for a command that needs an existing database.
///
/// # Errors
///
/// Returns `Config` when no location can be determined and `NotInitialized`
/// when the file does not exist yet.
pub fn require_db_path(explicit_path: Option<&Path>) -> Result<PathBuf> {
    let path = resolve_db_path(explicit_path)
        .ok_or_else(|| Error::Config("could not determine home directory".to_string()))?;
    if !path.exists() {
        return Err(Error::NotInitialized);
    }
    Ok(path)
}

/// Resolve the actor for audit events: the `--actor` flag or the default.
#[must_use]
pub fn resolve_actor(explicit: Option<&str>) -> String {
    match explicit {
        Some(actor) if !actor.trim().is_empty() => actor.to_string(),
        _ => default_actor(),
    }
}

/// Get the default actor name.
///
/// Priority:
/// 1. `PROG_ACTOR` environment variable
/// 2. Git user name
/// 3. System username
/// 4. "unknown"
#[must_use]
pub fn default_actor() -> String {
    if let Ok(actor) = std::env::var(ACTOR_ENV) {
        if !actor.is_empty() {
            return actor;
        }
    }

    if let Ok(output) = std::process::Command::new("git")
        .args(["config", "user.name"])
        .output()
    {
        if output.status.success() {
            let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !name.is_empty() {
                return name;
            }
        }
    }

    if let Ok(user) = std::env::var("USER") {
        return user;
    }

    "unknown".to_string()
}

/// Normalize a `--project` value: blank means unscoped.
#[must_use]
pub fn resolve_project(explicit: Option<&str>) -> Option<String> {
    explicit
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_actor() {
        let actor = default_actor();
        assert!(!actor.is_empty());
    }

    #[test]
    fn test_resolve_actor_prefers_flag() {
        assert_eq!(resolve_actor(Some("agent-7")), "agent-7");
        assert!(!resolve_actor(Some("  ")).trim().is_empty());
    }

    #[test]
    fn test_resolve_db_path_with_explicit() {
        let explicit = PathBuf::from("/custom/path/prog.db");
        let result = resolve_db_path(Some(&explicit));
        assert_eq!(result, Some(explicit));
    }

    #[test]
    fn test_resolve_db_path_default_is_global() {
        let path = resolve_db_path(None).unwrap();
        assert!(path.ends_with("prog.db"));
        assert!(path.to_string_lossy().contains(".prog"));
    }

    #[test]
    fn test_test_db_path_is_separate() {
        let global = global_prog_dir().unwrap();
        let test = test_db_path().unwrap();

        assert!(test.to_string_lossy().contains("test"));
        assert!(test.ends_with("prog.db"));
        assert_ne!(global.join("prog.db"), test);
    }

    #[test]
    fn test_truthy_parsing() {
        assert!(!is_truthy(""));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy("FALSE"));
        assert!(is_truthy("1"));
        assert!(is_truthy("yes"));
    }

    #[test]
    fn test_require_db_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.db");
        assert!(matches!(
            require_db_path(Some(&missing)),
            Err(Error::NotInitialized)
        ));
    }

    #[test]
    fn test_resolve_project() {
        assert_eq!(resolve_project(Some(" api ")), Some("api".to_string()));
        assert_eq!(resolve_project(Some("")), None);
        assert_eq!(resolve_project(None), None);
    }
}
