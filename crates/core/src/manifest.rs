//! Offline asset manifest.
//!
//! The manifest is the closed set of request identifiers that must be served
//! without a network round-trip once the worker is installed. Identifiers are
//! resolved against the application's base URL and partitioned by origin.
//!
//! ### Request identifiers
//! - Relative paths (`./app.js`, `/index.html`) resolve against the base URL
//! - Absolute URLs are kept as-is
//! - Fragments are removed, query strings preserved
//! - Only `http` and `https` are accepted

use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;

/// Which side of the origin boundary a request falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Same origin as the application; versioned together with the worker.
    Local,
    /// Third-party origin (fonts, frameworks, icon sets).
    Remote,
}

/// Resolve a request identifier against the application base URL.
pub fn canonicalize(base: &Url, request_id: &str) -> Result<Url, Error> {
    let trimmed = request_id.trim();

    if trimmed.is_empty() {
        return Err(Error::InvalidUrl("empty request identifier".into()));
    }

    let mut parsed = base
        .join(trimmed)
        .map_err(|e| Error::InvalidUrl(format!("{trimmed}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(Error::InvalidUrl(format!("unsupported scheme: {scheme}"))),
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Classify `url` relative to the application base URL.
pub fn classify(base: &Url, url: &Url) -> Origin {
    if url.origin() == base.origin() { Origin::Local } else { Origin::Remote }
}

/// One asset that must be available offline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// The identifier as written in the manifest.
    pub request_id: String,
    /// The resolved URL; its string form is the cache key.
    pub url: Url,
    pub origin: Origin,
}

impl ManifestEntry {
    pub fn is_local(&self) -> bool {
        self.origin == Origin::Local
    }
}

/// Ordered, de-duplicated list of offline assets.
#[derive(Debug, Clone)]
pub struct AssetManifest {
    base: Url,
    entries: Vec<ManifestEntry>,
}

impl AssetManifest {
    /// Resolve and classify every identifier.
    ///
    /// Identifiers that resolve to the same URL are collapsed, keeping the
    /// first occurrence.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` for any identifier that does not resolve to
    /// an `http`/`https` URL.
    pub fn new<I, S>(base: Url, request_ids: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for request_id in request_ids {
            let request_id = request_id.as_ref();
            let url = canonicalize(&base, request_id)?;
            if !seen.insert(url.as_str().to_string()) {
                tracing::debug!("duplicate manifest entry {} ignored", request_id);
                continue;
            }
            let origin = classify(&base, &url);
            entries.push(ManifestEntry { request_id: request_id.to_string(), url, origin });
        }

        Ok(Self { base, entries })
    }

    /// The application's serving URL.
    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn local(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter().filter(|e| e.origin == Origin::Local)
    }

    pub fn remote(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter().filter(|e| e.origin == Origin::Remote)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://app.test/").unwrap()
    }

    #[test]
    fn test_canonicalize_relative() {
        let url = canonicalize(&base(), "./index.html").unwrap();
        assert_eq!(url.as_str(), "https://app.test/index.html");
    }

    #[test]
    fn test_canonicalize_root_forms_agree() {
        let a = canonicalize(&base(), "./styles.css").unwrap();
        let b = canonicalize(&base(), "/styles.css").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_canonicalize_absolute() {
        let url = canonicalize(&base(), "https://fonts.example.com/css?family=Cinzel").unwrap();
        assert_eq!(url.host_str(), Some("fonts.example.com"));
        assert_eq!(url.query(), Some("family=Cinzel"));
    }

    #[test]
    fn test_canonicalize_remove_fragment() {
        let url = canonicalize(&base(), "/index.html#counters").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/index.html");
    }

    #[test]
    fn test_canonicalize_empty() {
        assert!(matches!(canonicalize(&base(), "   "), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_canonicalize_unsupported_scheme() {
        let result = canonicalize(&base(), "data:text/plain,hi");
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_classify_by_origin() {
        let base = base();
        assert_eq!(classify(&base, &Url::parse("https://app.test/app.js").unwrap()), Origin::Local);
        assert_eq!(classify(&base, &Url::parse("http://app.test/app.js").unwrap()), Origin::Remote);
        assert_eq!(classify(&base, &Url::parse("https://app.test:8443/app.js").unwrap()), Origin::Remote);
        assert_eq!(classify(&base, &Url::parse("https://cdn.test/app.js").unwrap()), Origin::Remote);
    }

    #[test]
    fn test_manifest_partition() {
        let manifest = AssetManifest::new(
            base(),
            ["./", "./index.html", "https://cdn.test/fa/all.min.css", "./app.js"],
        )
        .unwrap();

        assert_eq!(manifest.len(), 4);
        assert_eq!(manifest.local().count(), 3);
        let remote: Vec<_> = manifest.remote().map(|e| e.request_id.as_str()).collect();
        assert_eq!(remote, vec!["https://cdn.test/fa/all.min.css"]);
    }

    #[test]
    fn test_manifest_dedupes_and_keeps_order() {
        let manifest = AssetManifest::new(base(), ["./index.html", "/app.js", "/index.html"]).unwrap();
        let ids: Vec<_> = manifest.entries().iter().map(|e| e.request_id.as_str()).collect();
        assert_eq!(ids, vec!["./index.html", "/app.js"]);
    }

    #[test]
    fn test_manifest_rejects_bad_entry() {
        let result = AssetManifest::new(base(), ["./index.html", "ftp://files.test/a"]);
        assert!(result.is_err());
    }
}
