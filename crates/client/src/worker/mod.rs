//! The offline worker: install, activate, intercept.
//!
//! One `Worker` value exists per cache generation. Its lifecycle is
//!
//! ```text
//! idle -> installing -> installed -> activating -> active
//!            \
//!             -> redundant (store could not be opened)
//! ```
//!
//! The generation is fixed when the worker is built. The interceptor is
//! created once the install opens the store and is read-only afterwards.

pub mod activate;
pub mod host;
pub mod install;
pub mod intercept;
pub mod policy;

#[cfg(test)]
pub(crate) mod testing;

use crate::fetch::{AssetRequest, Fetcher};
use hoard_core::{AppConfig, AssetManifest, CacheDb, CacheStore, Error, VersionTag, manifest};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, OnceLock};
use tokio::sync::RwLock;
use url::Url;

pub use activate::ActivationReport;
pub use host::{ClientRegistry, Host};
pub use install::{InstallReport, SkippedAsset};
pub use intercept::Interceptor;
pub use policy::{Policy, Resolution, ResponseSource};

/// Worker lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Idle,
    Installing,
    Installed,
    Activating,
    Active,
    Redundant,
}

impl WorkerState {
    /// Whether requests are answered through the cache.
    pub fn intercepts(&self) -> bool {
        matches!(self, WorkerState::Active)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerState::Idle => "idle",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Active => "active",
            WorkerState::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

/// Offline caching worker for one cache generation.
pub struct Worker {
    tag: VersionTag,
    manifest: AssetManifest,
    index_key: String,
    install_concurrency: usize,
    db: CacheDb,
    fetcher: Arc<dyn Fetcher>,
    host: Arc<dyn Host>,
    state: RwLock<WorkerState>,
    interceptor: OnceLock<Interceptor>,
    last_install: RwLock<Option<InstallReport>>,
    last_activation: RwLock<Option<ActivationReport>>,
}

impl Worker {
    /// Build the worker for the generation named by `config`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the origin, manifest or index document
    /// in `config` cannot be resolved.
    pub fn new(config: &AppConfig, db: CacheDb, fetcher: Arc<dyn Fetcher>, host: Arc<dyn Host>) -> Result<Self, Error> {
        let manifest = config
            .asset_manifest()
            .map_err(|e| Error::InvalidInput(e.to_string()))?;
        let index_key = manifest::canonicalize(manifest.base(), &config.index_document)?.to_string();

        Ok(Self {
            tag: config.version_tag(),
            manifest,
            index_key,
            install_concurrency: config.install_concurrency,
            db,
            fetcher,
            host,
            state: RwLock::new(WorkerState::Idle),
            interceptor: OnceLock::new(),
            last_install: RwLock::new(None),
            last_activation: RwLock::new(None),
        })
    }

    pub fn tag(&self) -> &VersionTag {
        &self.tag
    }

    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    pub fn base_url(&self) -> &Url {
        self.manifest.base()
    }

    /// The database holding every generation.
    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    /// The current generation, once install has opened it.
    pub fn store(&self) -> Option<&CacheStore> {
        self.interceptor.get().map(Interceptor::store)
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    pub async fn install_report(&self) -> Option<InstallReport> {
        self.last_install.read().await.clone()
    }

    pub async fn activation_report(&self) -> Option<ActivationReport> {
        self.last_activation.read().await.clone()
    }

    async fn transition(&self, from: WorkerState, to: WorkerState) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if *state != from {
            return Err(Error::Lifecycle(format!("cannot enter {to} from {}", *state)));
        }
        tracing::info!(tag = self.tag.name(), "worker {} -> {}", from, to);
        *state = to;
        Ok(())
    }

    /// Open this generation's store and pre-fetch the manifest into it.
    ///
    /// Completes even if some (or all) manifest entries fail.
    ///
    /// # Errors
    ///
    /// Returns `Error::Lifecycle` unless the worker is idle, and a storage
    /// error if the store cannot be opened (the worker becomes redundant).
    pub async fn install(&self) -> Result<InstallReport, Error> {
        self.transition(WorkerState::Idle, WorkerState::Installing).await?;

        let store = match self.db.open_store(self.tag.name()).await {
            Ok(store) => store,
            Err(e) => {
                tracing::error!(tag = self.tag.name(), "failed to open cache store: {}", e);
                *self.state.write().await = WorkerState::Redundant;
                return Err(e);
            }
        };

        self.host.skip_waiting().await;

        let report = match install::install(&store, &self.manifest, self.fetcher.clone(), self.install_concurrency).await
        {
            Ok(report) => report,
            Err(e) => {
                *self.state.write().await = WorkerState::Redundant;
                return Err(e);
            }
        };

        let interceptor = Interceptor::new(self.base_url().clone(), store, self.fetcher.clone(), self.index_key.clone());
        if self.interceptor.set(interceptor).is_err() {
            return Err(Error::Lifecycle("worker already installed".into()));
        }

        *self.last_install.write().await = Some(report.clone());
        self.transition(WorkerState::Installing, WorkerState::Installed).await?;
        Ok(report)
    }

    /// Claim open clients and delete stale generations.
    ///
    /// # Errors
    ///
    /// Returns `Error::Lifecycle` unless the worker is installed.
    pub async fn activate(&self) -> Result<ActivationReport, Error> {
        self.transition(WorkerState::Installed, WorkerState::Activating).await?;

        let report = activate::activate(&self.db, &self.tag, self.host.as_ref()).await;

        *self.last_activation.write().await = Some(report.clone());
        self.transition(WorkerState::Activating, WorkerState::Active).await?;
        Ok(report)
    }

    /// Install, then activate immediately.
    pub async fn start(&self) -> Result<(InstallReport, ActivationReport), Error> {
        let installed = self.install().await?;
        let activated = self.activate().await?;
        Ok((installed, activated))
    }

    /// Answer a request from the application.
    ///
    /// Once active, requests go through the origin-specific policy. Before
    /// that, they go straight to the network.
    ///
    /// # Errors
    ///
    /// Only storage faults are returned.
    pub async fn handle_fetch(&self, request: &AssetRequest) -> Result<Resolution, Error> {
        let state = self.state().await;
        match self.interceptor.get() {
            Some(interceptor) if state.intercepts() => interceptor.handle(request).await,
            _ => {
                tracing::debug!(state = %state, "not controlling, passing {} through", request.url);
                intercept::passthrough(self.fetcher.as_ref(), request).await
            }
        }
    }

    /// Resolve a request identifier (relative or absolute) against the app URL.
    pub fn request(&self, request_id: &str) -> Result<AssetRequest, Error> {
        Ok(AssetRequest::new(manifest::canonicalize(self.base_url(), request_id)?))
    }
}
