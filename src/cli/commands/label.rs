//! Label command implementations.

use super::output::print_json;
use super::Globals;
use crate::cli::LabelCommands;
use crate::error::Result;
use serde::Serialize;

#[derive(Serialize)]
struct LabelOutput<'a> {
    id: &'a str,
    labels: Vec<String>,
}

/// Execute label subcommands.
///
/// # Errors
///
/// Returns `ItemNotFound` or `InvalidArgument` for a blank label.
pub fn execute(command: &LabelCommands, globals: &Globals) -> Result<()> {
    let mut storage = globals.open()?;
    let actor = globals.actor();

    let id = match command {
        LabelCommands::Add { id, labels } => {
            for label in labels {
                storage.add_label(id, label, &actor)?;
            }
            id
        }
        LabelCommands::Remove { id, labels } => {
            for label in labels {
                storage.remove_label(id, label, &actor)?;
            }
            id
        }
    };

    let labels = storage.get_labels(id)?;
    if globals.json {
        print_json(&LabelOutput { id, labels })
    } else {
        if !crate::is_quiet() {
            if labels.is_empty() {
                println!("{id}: no labels");
            } else {
                println!("{id}: {}", labels.join(", "));
            }
        }
        Ok(())
    }
}
