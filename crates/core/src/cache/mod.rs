//! SQLite-backed storage for versioned response caches.
//!
//! This module provides a persistent store of captured responses, grouped
//! into named generations, using SQLite with async access via
//! tokio-rusqlite. It supports:
//!
//! - Several named stores side by side during an upgrade
//! - Body digests checked on every read
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod hash;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use store::{CacheStore, StoreSummary};
