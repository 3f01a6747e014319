//! Data models for prog.
//!
//! - Item (task or epic), Status, ItemType
//! - Log
//! - Project

pub mod item;
pub mod project;

pub use item::{generate_id, Item, ItemType, Log, Status, DEFAULT_PRIORITY};
pub use project::Project;
