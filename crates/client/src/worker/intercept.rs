//! Request interception: pick a policy by origin and resolve through it.

use super::policy::{Policy, PolicyContext, Resolution, ResponseSource};
use crate::fetch::{AssetRequest, Fetcher};
use hoard_core::{CacheStore, CapturedResponse, Error, Origin, manifest};
use std::sync::Arc;
use url::Url;

/// Answers every request of an active worker from its current generation.
pub struct Interceptor {
    base: Url,
    store: CacheStore,
    fetcher: Arc<dyn Fetcher>,
    index_key: String,
}

impl Interceptor {
    pub fn new(base: Url, store: CacheStore, fetcher: Arc<dyn Fetcher>, index_key: String) -> Self {
        Self { base, store, fetcher, index_key }
    }

    /// The generation this interceptor reads and writes.
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn origin_of(&self, request: &AssetRequest) -> Origin {
        manifest::classify(&self.base, &request.url)
    }

    /// Resolve one request.
    ///
    /// # Errors
    ///
    /// Only storage faults are returned; network failures resolve to cached
    /// content or the 503 fallback.
    pub async fn handle(&self, request: &AssetRequest) -> Result<Resolution, Error> {
        let policy = Policy::for_origin(self.origin_of(request));
        let ctx = PolicyContext { store: &self.store, fetcher: self.fetcher.as_ref(), index_key: &self.index_key };

        policy.resolve(&ctx, request).await.inspect_err(|e| {
            tracing::error!(store = self.store.name(), "failed to resolve {}: {}", request.url, e);
        })
    }
}

/// Resolve a request straight from the network, for a worker that does not
/// control the client yet.
pub async fn passthrough(fetcher: &dyn Fetcher, request: &AssetRequest) -> Result<Resolution, Error> {
    match fetcher.fetch(request).await {
        Ok(response) => Ok(Resolution { response, source: ResponseSource::Network }),
        Err(e) if e.is_fetch_failure() => {
            tracing::debug!("network failed for {}: {}", request.url, e);
            Ok(Resolution { response: CapturedResponse::service_unavailable(), source: ResponseSource::Fallback })
        }
        Err(e) => Err(e),
    }
}
