//! SQLite storage layer for prog.
//!
//! This module provides the persistence layer using SQLite with:
//! - WAL mode for concurrent reads
//! - IMMEDIATE transactions for atomic writes
//! - Audit events for history
//!
//! # Submodules
//!
//! - [`sqlite`] - Connection, mutation protocol, item CRUD
//! - [`deps`] - Dependency edges and cycle rejection
//! - [`queries`] - Listing, readiness, status reports
//! - [`events`] - Audit event storage
//! - [`schema`] / [`migrations`] - DDL and upgrades

pub mod deps;
pub mod events;
pub mod migrations;
pub mod queries;
pub mod schema;
pub mod sqlite;

pub use deps::DepEdge;
pub use queries::{ListFilter, StatusReport};
pub use sqlite::{MutationContext, SqliteStorage};
