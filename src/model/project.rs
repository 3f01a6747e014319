//! Project model for prog.
//!
//! Projects are plain named scopes. They are registered implicitly the first
//! time an item is created in them.

use serde::{Deserialize, Serialize};

/// A project in prog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Project name (primary key)
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}
