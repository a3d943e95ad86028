//! Core types and shared functionality for hoard.
//!
//! This crate provides:
//! - Versioned response cache with SQLite backend
//! - Asset manifest and version tags
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod manifest;
pub mod response;
pub mod version;

pub use cache::{CacheDb, CacheStore, StoreSummary};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use manifest::{AssetManifest, ManifestEntry, Origin};
pub use response::{CapturedResponse, ResponseKind};
pub use version::VersionTag;
