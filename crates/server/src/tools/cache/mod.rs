//! Cache inspection tools.

pub mod get;
pub mod stores;

pub use get::{CacheMatchParams, match_impl};
pub use stores::stores_impl;
