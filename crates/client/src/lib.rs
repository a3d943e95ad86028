//! Client code for hoard.
//!
//! This crate provides the HTTP fetch pipeline and the offline worker:
//! install-time pre-caching, activation with stale-generation cleanup, and
//! request interception with origin-specific retrieval policies.

pub mod fetch;
pub mod worker;

pub use fetch::{AssetRequest, CacheMode, FetchConfig, Fetcher, HttpFetcher, RequestMode};
pub use worker::{
    ActivationReport, ClientRegistry, Host, InstallReport, Interceptor, Policy, Resolution, ResponseSource,
    SkippedAsset, Worker, WorkerState,
};
