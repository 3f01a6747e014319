//! Status transition commands: start, review, block, done, cancel, reopen.

use super::output::{item_line, print_json, summaries};
use super::Globals;
use crate::error::{Error, Result};
use crate::model::Status;
use crate::storage::SqliteStorage;

/// Which command invoked the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Start,
    Review,
    Block,
    Done,
    Cancel,
    Reopen,
}

impl Transition {
    #[must_use]
    pub const fn target(self) -> Status {
        match self {
            Self::Start => Status::InProgress,
            Self::Review => Status::Reviewing,
            Self::Block => Status::Blocked,
            Self::Done => Status::Done,
            Self::Cancel => Status::Canceled,
            Self::Reopen => Status::Open,
        }
    }

    const fn verb(self) -> &'static str {
        match self {
            Self::Start => "Started",
            Self::Review => "In review",
            Self::Block => "Blocked",
            Self::Done => "Done",
            Self::Cancel => "Canceled",
            Self::Reopen => "Reopened",
        }
    }
}

/// Apply `transition` to each ID in turn.
///
/// Every ID is checked first, so a missing item or a rejected transition
/// leaves all of them untouched.
///
/// # Errors
///
/// Returns the first failed precondition before anything is written.
pub fn execute(transition: Transition, ids: &[String], globals: &Globals) -> Result<()> {
    let mut storage = globals.open()?;
    let actor = globals.actor();

    for id in ids {
        check(&storage, transition, id)?;
    }

    let mut updated = Vec::with_capacity(ids.len());
    for id in ids {
        apply(&mut storage, transition, id, &actor)?;
        updated.push(storage.get_item(id)?);
    }

    if globals.json {
        print_json(&summaries(&updated))?;
    } else if !crate::is_quiet() {
        for item in &updated {
            println!("{} {}", transition.verb(), item_line(item));
        }
    }
    Ok(())
}

/// Check whether `transition` may be applied to `id` without writing.
///
/// # Errors
///
/// `ItemNotFound` for a missing item, `InvalidTransition` when an epic is
/// asked for a non-terminal status, `InvalidArgument` when `review` finds
/// the item anywhere but in progress.
pub fn check(storage: &SqliteStorage, transition: Transition, id: &str) -> Result<()> {
    let item = storage.get_item(id)?;
    let target = transition.target();
    if item.is_epic() && !target.is_terminal() {
        return Err(Error::InvalidTransition {
            id: item.id,
            requested: target.to_string(),
        });
    }
    if transition == Transition::Review {
        let current = storage.get_effective_status(id)?;
        if current != Status::InProgress {
            return Err(Error::InvalidArgument(format!(
                "can only review in_progress tasks (current status: {current})"
            )));
        }
    }
    Ok(())
}

/// Apply one transition, enforcing the command-level preconditions.
///
/// # Errors
///
/// See [`check`]; the store repeats the epic rule inside its transaction.
pub fn apply(
    storage: &mut SqliteStorage,
    transition: Transition,
    id: &str,
    actor: &str,
) -> Result<()> {
    check(storage, transition, id)?;
    storage.update_status(id, transition.target(), actor)
}
