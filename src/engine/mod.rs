//! Status derivation and dependency resolution.
//!
//! Both halves are pure: they take stored statuses and return answers, with
//! no database access. Storage feeds them and [`resolve::DEP_UNRESOLVED_SQL`]
//! carries the same rule into queries.

pub mod derive;
pub mod resolve;

pub use derive::{derive_status, ChildCounts};
pub use resolve::{is_unresolved, DEP_UNRESOLVED_SQL};
