//! Version command implementation.

use super::output::print_json;
use crate::error::Result;
use crate::storage::schema::CURRENT_SCHEMA_VERSION;
use serde::Serialize;

#[derive(Serialize)]
struct VersionOutput {
    version: &'static str,
    schema_version: i32,
    build: &'static str,
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let output = VersionOutput {
        version: env!("CARGO_PKG_VERSION"),
        schema_version: CURRENT_SCHEMA_VERSION,
        build: if cfg!(debug_assertions) { "dev" } else { "release" },
    };

    if json {
        return print_json(&output);
    }

    println!(
        "prog version {} (schema v{}, {})",
        output.version, output.schema_version, output.build
    );
    Ok(())
}
