//! Outgoing request model.

use url::Url;

/// What kind of load issued the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    /// Top-level document load (the user opening the app).
    Navigate,
    /// Subresource load: scripts, styles, fonts, images, data.
    #[default]
    Subresource,
}

/// How the request should treat intermediate HTTP caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    #[default]
    Default,
    /// Ask every intermediary for a fresh copy.
    NoStore,
}

/// A request as seen by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub url: Url,
    pub mode: RequestMode,
    pub cache: CacheMode,
}

impl AssetRequest {
    /// Build a request for `url`. The fragment never reaches the network or
    /// the cache key, so it is dropped here.
    pub fn new(mut url: Url) -> Self {
        url.set_fragment(None);
        Self { url, mode: RequestMode::default(), cache: CacheMode::default() }
    }

    /// Mark this request as a top-level navigation.
    pub fn navigate(mut self) -> Self {
        self.mode = RequestMode::Navigate;
        self
    }

    /// Bypass intermediate caches.
    pub fn no_store(mut self) -> Self {
        self.cache = CacheMode::NoStore;
        self
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// The cache key for this request.
    pub fn key(&self) -> &str {
        self.url.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let request = AssetRequest::new(Url::parse("https://app.test/app.js").unwrap());
        assert!(!request.is_navigation());
        assert_eq!(request.cache, CacheMode::Default);
        assert_eq!(request.key(), "https://app.test/app.js");
    }

    #[test]
    fn test_fragment_dropped_from_key() {
        let request = AssetRequest::new(Url::parse("https://app.test/index.html#counters").unwrap());
        assert_eq!(request.key(), "https://app.test/index.html");
        assert_eq!(request.url.fragment(), None);
    }

    #[test]
    fn test_builders() {
        let request = AssetRequest::new(Url::parse("https://app.test/").unwrap())
            .navigate()
            .no_store();
        assert!(request.is_navigation());
        assert_eq!(request.cache, CacheMode::NoStore);
    }
}
