//! Retrieval policies.
//!
//! Same-origin assets ship with the worker and only change on a version bump,
//! so they are served cache-first. Third-party assets change outside our
//! control, so they are fetched network-first with the cache as fallback.

use crate::fetch::{AssetRequest, Fetcher};
use async_trait::async_trait;
use hoard_core::{CacheStore, CapturedResponse, Error, Origin, ResponseKind};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where a resolved response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Cache,
    Network,
    Fallback,
}

/// A response for the application plus its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub response: CapturedResponse,
    pub source: ResponseSource,
}

impl Resolution {
    fn cache(response: CapturedResponse) -> Self {
        Self { response, source: ResponseSource::Cache }
    }

    fn network(response: CapturedResponse) -> Self {
        Self { response, source: ResponseSource::Network }
    }

    fn fallback() -> Self {
        Self { response: CapturedResponse::service_unavailable(), source: ResponseSource::Fallback }
    }
}

/// What a policy may touch while resolving one request.
pub struct PolicyContext<'a> {
    pub store: &'a CacheStore,
    pub fetcher: &'a dyn Fetcher,
    /// Cache key of the app shell served to offline navigations.
    pub index_key: &'a str,
}

impl PolicyContext<'_> {
    /// Store a copy of `response` without failing the request if the write fails.
    async fn store_copy(&self, request: &AssetRequest, response: &CapturedResponse) {
        match self.store.put(request.key(), response.clone()).await {
            Ok(()) => tracing::debug!("cached {}", request.url),
            Err(e) => tracing::warn!("failed to cache {}: {}", request.url, e),
        }
    }
}

/// Contract shared by every retrieval policy.
///
/// Implementations never surface network failures: they resolve to cached
/// content or the synthetic 503. Only storage faults are returned as errors.
#[async_trait]
pub trait Retrieve: Send + Sync {
    async fn resolve(&self, ctx: &PolicyContext<'_>, request: &AssetRequest) -> Result<Resolution, Error>;
}

/// Serve from the store; go to the network only on a miss.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheFirst;

/// Go to the network; fall back to the store only when it fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkFirst;

#[async_trait]
impl Retrieve for CacheFirst {
    async fn resolve(&self, ctx: &PolicyContext<'_>, request: &AssetRequest) -> Result<Resolution, Error> {
        if let Some(cached) = ctx.store.match_request(request.key()).await? {
            tracing::debug!("serving from cache: {}", request.url);
            return Ok(Resolution::cache(cached));
        }

        tracing::debug!("cache miss, fetching from network: {}", request.url);
        match ctx.fetcher.fetch(request).await {
            Ok(response) => {
                if response.kind == ResponseKind::Basic && response.is_cacheable() {
                    ctx.store_copy(request, &response).await;
                }
                Ok(Resolution::network(response))
            }
            Err(e) if e.is_fetch_failure() => {
                tracing::debug!("network failed for {}: {}", request.url, e);
                if request.is_navigation()
                    && let Some(shell) = ctx.store.match_request(ctx.index_key).await?
                {
                    return Ok(Resolution::cache(shell));
                }
                Ok(Resolution::fallback())
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl Retrieve for NetworkFirst {
    async fn resolve(&self, ctx: &PolicyContext<'_>, request: &AssetRequest) -> Result<Resolution, Error> {
        match ctx.fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    ctx.store_copy(request, &response).await;
                }
                Ok(Resolution::network(response))
            }
            Err(e) if e.is_fetch_failure() => {
                tracing::debug!("network failed for {}, trying cache: {}", request.url, e);
                match ctx.store.match_request(request.key()).await? {
                    Some(cached) => Ok(Resolution::cache(cached)),
                    None => Ok(Resolution::fallback()),
                }
            }
            Err(e) => Err(e),
        }
    }
}

/// The policy chosen for one request.
#[derive(Debug, Clone, Copy)]
pub enum Policy {
    Local(CacheFirst),
    Remote(NetworkFirst),
}

impl Policy {
    pub fn for_origin(origin: Origin) -> Self {
        match origin {
            Origin::Local => Policy::Local(CacheFirst),
            Origin::Remote => Policy::Remote(NetworkFirst),
        }
    }

    pub async fn resolve(&self, ctx: &PolicyContext<'_>, request: &AssetRequest) -> Result<Resolution, Error> {
        match self {
            Policy::Local(policy) => policy.resolve(ctx, request).await,
            Policy::Remote(policy) => policy.resolve(ctx, request).await,
        }
    }
}
