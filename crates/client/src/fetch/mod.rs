//! HTTP fetch pipeline.
//!
//! ### Contract
//! - Any HTTP status is a response, not an error: 404 and 500 come back as
//!   `Ok` so callers can decide whether to cache them.
//! - Transport failures (DNS, connect, TLS, reset, body read) are
//!   `Error::FetchFailed`; timeouts are `Error::FetchTimeout`.
//! - Bodies over `max_bytes` are `Error::FetchTooLarge`.
//!
//! ### Response type
//! - `basic` when both the request and the final URL share the app origin
//! - `cors` otherwise (a native client can read cross-origin bodies)

pub mod request;

use async_trait::async_trait;
use hoard_core::{CapturedResponse, Error, ResponseKind};
use reqwest::{Client, header};
use std::time::{Duration, Instant};
use url::Url;

pub use request::{AssetRequest, CacheMode, RequestMode};

/// Anything that can turn a request into a response over the network.
///
/// The worker only talks to the network through this trait, so the install
/// and interception paths can be exercised against scripted responses.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &AssetRequest) -> Result<CapturedResponse, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// URL the application is served from; decides `basic` vs `cors`.
    pub app_origin: Url,

    /// User agent string (default: "hoard/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl FetchConfig {
    pub fn new(app_origin: Url) -> Self {
        Self {
            app_origin,
            user_agent: "hoard/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

/// reqwest-backed `Fetcher`.
pub struct HttpFetcher {
    http: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::FetchFailed(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn response_kind(&self, requested: &Url, final_url: &Url) -> ResponseKind {
        let app = self.config.app_origin.origin();
        if requested.origin() == app && final_url.origin() == app { ResponseKind::Basic } else { ResponseKind::Cors }
    }
}

fn transport_error(url: &Url, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::FetchTimeout(format!("{url}: {err}"))
    } else {
        Error::FetchFailed(format!("{url}: {err}"))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &AssetRequest) -> Result<CapturedResponse, Error> {
        let start = Instant::now();
        let url = &request.url;

        let mut builder = self.http.get(url.as_str());
        if request.cache == CacheMode::NoStore {
            builder = builder
                .header(header::CACHE_CONTROL, "no-cache, no-store")
                .header(header::PRAGMA, "no-cache");
        }

        let response = builder.send().await.map_err(|e| transport_error(url, e))?;

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{url}: {len} bytes exceeds {}", self.config.max_bytes)));
        }

        let status = response.status();
        let kind = self.response_kind(url, response.url());
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect();

        let bytes = response.bytes().await.map_err(|e| transport_error(url, e))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!(
                "{url}: {} bytes exceeds {}",
                bytes.len(),
                self.config.max_bytes
            )));
        }

        tracing::debug!(
            "fetched {} -> {} in {}ms ({} bytes)",
            url,
            status.as_u16(),
            start.elapsed().as_millis(),
            bytes.len()
        );

        Ok(CapturedResponse::new(status.as_u16(), status.canonical_reason().unwrap_or(""), headers, bytes, kind))
    }
}
