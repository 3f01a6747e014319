//! Error type shared by the store, the engine and the CLI.
//!
//! Every [`Error`] carries a stable [`ErrorCode`]. The code decides the
//! process exit status and whether a caller may retry after fixing its
//! input; [`Error::hint`] adds a next step where one exists. Non-TTY runs
//! print [`Error::to_structured_json`] on stderr instead of plain text.
//!
//! `InvariantViolation` and `CorruptValue` mean the stored data, or the
//! in-memory and SQL readings of it, disagree. They exit with 1 and are
//! never retryable.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for prog operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database (exit 2)
    NotInitialized,
    AlreadyInitialized,
    DatabaseError,

    // Not Found (exit 3)
    ItemNotFound,

    // Validation (exit 4)
    InvalidStatus,
    InvalidType,
    InvalidPriority,
    InvalidParent,
    InvalidTransition,
    InvalidArgument,

    // Dependency (exit 5)
    CycleDetected,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InvariantViolation,
    CorruptData,
}

impl ErrorCode {
    /// Stable code printed in JSON errors.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::ItemNotFound => "ITEM_NOT_FOUND",
            Self::InvalidStatus => "INVALID_STATUS",
            Self::InvalidType => "INVALID_TYPE",
            Self::InvalidPriority => "INVALID_PRIORITY",
            Self::InvalidParent => "INVALID_PARENT",
            Self::InvalidTransition => "INVALID_TRANSITION",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::CycleDetected => "CYCLE_DETECTED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InvariantViolation => "INVARIANT_VIOLATION",
            Self::CorruptData => "CORRUPT_DATA",
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InvariantViolation | Self::CorruptData => 1,
            Self::NotInitialized | Self::AlreadyInitialized | Self::DatabaseError => 2,
            Self::ItemNotFound => 3,
            Self::InvalidStatus
            | Self::InvalidType
            | Self::InvalidPriority
            | Self::InvalidParent
            | Self::InvalidTransition
            | Self::InvalidArgument => 4,
            Self::CycleDetected => 5,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Only validation failures are retryable: the same call with corrected
    /// input can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidStatus
                | Self::InvalidType
                | Self::InvalidPriority
                | Self::InvalidParent
                | Self::InvalidTransition
                | Self::InvalidArgument
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Every failure surfaced by the library.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not initialized: run `prog init` first")]
    NotInitialized,

    #[error("Already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    #[error("Item not found: {id}")]
    ItemNotFound { id: String },

    #[error("Item not found: {id} (did you mean: {}?)", similar.join(", "))]
    ItemNotFoundSimilar { id: String, similar: Vec<String> },

    #[error("Invalid status: {value}")]
    InvalidStatus {
        value: String,
        suggestion: Option<String>,
    },

    #[error("Invalid item type: {value}")]
    InvalidType {
        value: String,
        suggestion: Option<String>,
    },

    #[error("Invalid priority: {value}")]
    InvalidPriority {
        value: String,
        suggestion: Option<String>,
    },

    #[error("Parent must be an epic, got {actual} ({id})")]
    InvalidParent { id: String, actual: String },

    #[error(
        "Cannot set epic {id} to '{requested}': epic status is derived from children; \
         only 'done' and 'canceled' can be set manually (to force-close)"
    )]
    InvalidTransition { id: String, requested: String },

    #[error("Dependency {item_id} -> {depends_on} would create a cycle")]
    CycleDetected { item_id: String, depends_on: String },

    /// A stored enum column holds a value outside the known set.
    #[error("Corrupt {field} '{value}' stored for item {id}")]
    CorruptValue {
        field: &'static str,
        value: String,
        id: String,
    },

    /// Internal consistency check failed inside derivation or resolution.
    #[error("Internal invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::ItemNotFound { .. } | Self::ItemNotFoundSimilar { .. } => {
                ErrorCode::ItemNotFound
            }
            Self::InvalidStatus { .. } => ErrorCode::InvalidStatus,
            Self::InvalidType { .. } => ErrorCode::InvalidType,
            Self::InvalidPriority { .. } => ErrorCode::InvalidPriority,
            Self::InvalidParent { .. } => ErrorCode::InvalidParent,
            Self::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            Self::CycleDetected { .. } => ErrorCode::CycleDetected,
            Self::CorruptValue { .. } => ErrorCode::CorruptData,
            Self::InvariantViolation(_) => ErrorCode::InvariantViolation,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
        }
    }

    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Whether this is an internal bug rather than a user-facing problem.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self.error_code(),
            ErrorCode::InvariantViolation | ErrorCode::CorruptData
        )
    }

    /// A concrete next step for the caller, when there is one.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized => Some("Run `prog init` to initialize the database".to_string()),

            Self::AlreadyInitialized { path } => Some(format!(
                "Database already exists at {}. Use `--force` to reinitialize.",
                path.display()
            )),

            Self::ItemNotFound { id } => Some(format!(
                "No item with ID '{id}'. Use `prog list` to see available items."
            )),
            Self::ItemNotFoundSimilar { similar, .. } => {
                Some(format!("Did you mean: {}?", similar.join(", ")))
            }

            Self::InvalidStatus { suggestion, .. } => Some(suggestion.as_ref().map_or_else(
                || {
                    "Valid statuses: open, in_progress, blocked, reviewing, done, canceled. \
                     Synonyms: wip→in_progress, closed→done, cancelled→canceled"
                        .to_string()
                },
                |s| format!("Did you mean '{s}'?"),
            )),

            Self::InvalidType { suggestion, .. } => Some(suggestion.as_ref().map_or_else(
                || "Valid types: task, epic".to_string(),
                |s| format!("Did you mean '{s}'?"),
            )),

            Self::InvalidPriority { suggestion, .. } => Some(
                suggestion
                    .clone()
                    .unwrap_or_else(|| "Use 1-3, P1-P3, or: high, medium, low".to_string()),
            ),

            Self::InvalidParent { .. } => {
                Some("Create an epic with `prog add --epic \"title\"` and use its ID.".to_string())
            }

            Self::InvalidTransition { id, .. } => Some(format!(
                "Change the status of the epic's children instead, or force-close with \
                 `prog done {id}` / `prog cancel {id}`."
            )),

            Self::CycleDetected { depends_on, .. } => Some(format!(
                "{depends_on} already depends (directly or transitively) on this item. \
                 Use `prog dep list {depends_on}` to inspect the chain."
            )),

            Self::CorruptValue { .. } | Self::InvariantViolation(_) => Some(
                "This is a bug or a damaged database. Please report it with `prog -vv` output."
                    .to_string(),
            ),

            Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Config(_)
            | Self::InvalidArgument(_) => None,
        }
    }

    /// Machine-readable form: `{"error": {code, message, retryable, exit_code, hint?}}`.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        serde_json::json!({
            "error": ErrorBody {
                code: code.as_str(),
                message: self.to_string(),
                retryable: code.is_retryable(),
                exit_code: code.exit_code(),
                hint: self.hint(),
            }
        })
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
    retryable: bool,
    exit_code: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(Error::ItemNotFound { id: "x".into() }.exit_code(), 3);
        assert_eq!(
            Error::InvalidTransition {
                id: "ep-1".into(),
                requested: "open".into()
            }
            .exit_code(),
            4
        );
        assert_eq!(
            Error::CycleDetected {
                item_id: "a".into(),
                depends_on: "b".into()
            }
            .exit_code(),
            5
        );
        assert_eq!(Error::InvariantViolation("x".into()).exit_code(), 1);
    }

    #[test]
    fn test_internal_errors_are_distinguishable() {
        assert!(Error::InvariantViolation("sum".into()).is_internal());
        assert!(
            Error::CorruptValue {
                field: "status",
                value: "pending".into(),
                id: "ts-1".into()
            }
            .is_internal()
        );
        assert!(!Error::InvalidStatus {
            value: "x".into(),
            suggestion: None
        }
        .is_internal());
    }

    #[test]
    fn test_structured_json_shape() {
        let err = Error::InvalidTransition {
            id: "ep-abc123".into(),
            requested: "in_progress".into(),
        };
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "INVALID_TRANSITION");
        assert_eq!(json["error"]["retryable"], true);
        assert_eq!(json["error"]["exit_code"], 4);
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("derived from children"));
        assert!(json["error"]["hint"].is_string());
    }

    #[test]
    fn test_structured_json_omits_missing_hint() {
        let json = Error::InvalidArgument("empty title".into()).to_structured_json();
        assert_eq!(json["error"]["code"], "INVALID_ARGUMENT");
        assert!(json["error"].get("hint").is_none());
    }
}
