//! Install step: pre-fetch the manifest into a fresh generation.
//!
//! Every entry is fetched independently and concurrently. A failed entry is
//! logged and skipped; install always completes once every fetch has settled,
//! so whatever did arrive is available offline.

use crate::fetch::{AssetRequest, Fetcher};
use hoard_core::{AssetManifest, CacheStore, Error, ManifestEntry};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// A manifest entry that could not be cached during install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SkippedAsset {
    pub request_id: String,
    pub reason: String,
}

/// Outcome of an install run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InstallReport {
    /// Generation the assets were written to.
    pub store: String,
    /// Manifest identifiers now available offline, in manifest order.
    pub cached: Vec<String>,
    /// Manifest identifiers that were skipped, in manifest order.
    pub skipped: Vec<SkippedAsset>,
    /// ISO8601 timestamp of when every fetch had settled.
    pub completed_at: String,
}

impl InstallReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Build the install-time request for a manifest entry.
///
/// Local assets bypass intermediate caches so the generation starts from a
/// fresh copy; remote assets are fetched normally.
fn install_request(entry: &ManifestEntry) -> AssetRequest {
    let request = AssetRequest::new(entry.url.clone());
    if entry.is_local() { request.no_store() } else { request }
}

async fn cache_entry(store: &CacheStore, fetcher: &dyn Fetcher, entry: &ManifestEntry) -> Result<(), String> {
    let request = install_request(entry);
    let response = fetcher.fetch(&request).await.map_err(|e| e.to_string())?;

    if !response.is_cacheable() {
        return Err(if response.is_success() {
            format!("{} response, status {}", response.kind.as_str(), response.status)
        } else {
            format!("status {}", response.status)
        });
    }

    store
        .put(request.key(), response)
        .await
        .map_err(|e| e.to_string())
}

/// Fetch every manifest entry into `store`.
///
/// At most `concurrency` fetches are in flight at once.
///
/// # Errors
///
/// Individual asset failures never fail the install. An error is returned
/// only if `concurrency` is zero.
pub async fn install(
    store: &CacheStore, manifest: &AssetManifest, fetcher: Arc<dyn Fetcher>, concurrency: usize,
) -> Result<InstallReport, Error> {
    if concurrency == 0 {
        return Err(Error::InvalidInput("install concurrency must be at least 1".into()));
    }

    tracing::info!(store = store.name(), assets = manifest.len(), "pre-caching manifest");

    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut join_set = JoinSet::new();

    for (index, entry) in manifest.entries().iter().cloned().enumerate() {
        let semaphore = semaphore.clone();
        let store = store.clone();
        let fetcher = fetcher.clone();

        join_set.spawn(async move {
            // NOTE: Hold permit for task duration to enforce concurrency limit
            let outcome = match semaphore.acquire_owned().await {
                Ok(_permit) => cache_entry(&store, fetcher.as_ref(), &entry).await,
                Err(e) => Err(e.to_string()),
            };
            (index, outcome)
        });
    }

    let mut outcomes: HashMap<usize, Result<(), String>> = HashMap::new();
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((index, outcome)) => {
                outcomes.insert(index, outcome);
            }
            Err(e) => tracing::warn!("install task aborted: {}", e),
        }
    }

    let mut cached = Vec::new();
    let mut skipped = Vec::new();
    for (index, entry) in manifest.entries().iter().enumerate() {
        match outcomes.remove(&index) {
            Some(Ok(())) => cached.push(entry.request_id.clone()),
            Some(Err(reason)) => {
                tracing::warn!(store = store.name(), "failed to pre-cache {}: {}", entry.request_id, reason);
                skipped.push(SkippedAsset { request_id: entry.request_id.clone(), reason });
            }
            None => skipped.push(SkippedAsset {
                request_id: entry.request_id.clone(),
                reason: "install task aborted".into(),
            }),
        }
    }

    tracing::info!(store = store.name(), cached = cached.len(), skipped = skipped.len(), "install complete");

    Ok(InstallReport { store: store.name().to_string(), cached, skipped, completed_at: chrono::Utc::now().to_rfc3339() })
}
