//! prog - Local task and epic tracking for AI coding agents
//!
//! This crate provides the core functionality for the `prog` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (Item, Status, ItemType, Log, Project)
//! - [`engine`] - Epic status derivation and dependency resolution
//! - [`storage`] - SQLite database layer
//! - [`config`] - Database path and actor resolution
//! - [`validate`] - Lenient parsing of user input
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod storage;
pub mod validate;

pub use error::{Error, Result};

/// Global quiet flag for `-q`.
///
/// When set, mutate commands print only the new ID (for `add`) or nothing.
/// Avoids threading a `quiet` bool through every handler signature.
pub static QUIET: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);

/// Check if quiet mode is active.
#[inline]
pub fn is_quiet() -> bool {
    QUIET.load(std::sync::atomic::Ordering::Relaxed)
}
