//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (HOARD_*)
//! 2. TOML config file (if HOARD_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{AssetManifest, VersionTag};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (HOARD_*)
/// 2. TOML config file (if HOARD_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via HOARD_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// URL the application is served from. Requests sharing its origin are
    /// local; everything else is remote.
    ///
    /// Set via HOARD_APP_ORIGIN environment variable.
    #[serde(default = "default_app_origin")]
    pub app_origin: String,

    /// Application name; store names are `<app_name>-cache-v<cache_version>`.
    ///
    /// Set via HOARD_APP_NAME environment variable.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Cache generation. Bumping it installs a fresh store and removes the
    /// older ones on activation.
    ///
    /// Set via HOARD_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: u32,

    /// Request identifiers fetched at install time.
    ///
    /// Set via HOARD_MANIFEST environment variable (`[a, b, c]`).
    #[serde(default = "default_manifest")]
    pub manifest: Vec<String>,

    /// Document served to navigation requests when the network is gone.
    ///
    /// Set via HOARD_INDEX_DOCUMENT environment variable.
    #[serde(default = "default_index_document")]
    pub index_document: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via HOARD_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via HOARD_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via HOARD_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Maximum manifest fetches in flight during install.
    ///
    /// Set via HOARD_INSTALL_CONCURRENCY environment variable.
    #[serde(default = "default_install_concurrency")]
    pub install_concurrency: usize,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./hoard-cache.sqlite")
}

fn default_app_origin() -> String {
    "http://localhost:8080/".into()
}

fn default_app_name() -> String {
    "hoard".into()
}

fn default_cache_version() -> u32 {
    1
}

fn default_manifest() -> Vec<String> {
    [
        "./",
        "./index.html",
        "./styles.css",
        "./app.js",
        "./manifest.json",
        "./icon-192x192.png",
        "./icon-512x512.png",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_index_document() -> String {
    "./index.html".into()
}

fn default_user_agent() -> String {
    "hoard/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_install_concurrency() -> usize {
    4
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            app_origin: default_app_origin(),
            app_name: default_app_name(),
            cache_version: default_cache_version(),
            manifest: default_manifest(),
            index_document: default_index_document(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            install_concurrency: default_install_concurrency(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The cache generation this configuration installs.
    pub fn version_tag(&self) -> VersionTag {
        VersionTag::new(&self.app_name, self.cache_version)
    }

    /// Parsed application base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `app_origin` is not an absolute URL.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.app_origin)
            .map_err(|e| ConfigError::Invalid { field: "app_origin".into(), reason: e.to_string() })
    }

    /// Resolve the configured manifest against the base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the base URL or any entry is invalid.
    pub fn asset_manifest(&self) -> Result<AssetManifest, ConfigError> {
        AssetManifest::new(self.base_url()?, &self.manifest)
            .map_err(|e| ConfigError::Invalid { field: "manifest".into(), reason: e.to_string() })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `HOARD_`
    /// 2. TOML file from `HOARD_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("HOARD_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("HOARD_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
