//! Lifecycle signals to the environment hosting the worker.

use async_trait::async_trait;
use hoard_core::VersionTag;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// The environment that runs the worker and owns the application clients.
#[async_trait]
pub trait Host: Send + Sync {
    /// Activate the freshly installed worker as soon as install completes,
    /// instead of waiting for every open client to close.
    async fn skip_waiting(&self);

    /// Put every open client under the control of `tag` without a reload.
    ///
    /// Returns the number of clients that changed controller.
    async fn claim_clients(&self, tag: &VersionTag) -> usize;
}

/// In-process `Host`: tracks open clients and which generation controls each.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: RwLock<HashMap<String, Option<String>>>,
    skip_waiting: AtomicBool,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an open client, optionally already controlled by a generation.
    pub async fn connect(&self, client_id: impl Into<String>, controller: Option<&VersionTag>) {
        let mut clients = self.clients.write().await;
        clients.insert(client_id.into(), controller.map(|t| t.name().to_string()));
    }

    pub async fn disconnect(&self, client_id: &str) {
        self.clients.write().await.remove(client_id);
    }

    /// Name of the generation controlling `client_id`, if any.
    pub async fn controller(&self, client_id: &str) -> Option<String> {
        self.clients.read().await.get(client_id).cloned().flatten()
    }

    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }

    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Host for ClientRegistry {
    async fn skip_waiting(&self) {
        self.skip_waiting.store(true, Ordering::SeqCst);
    }

    async fn claim_clients(&self, tag: &VersionTag) -> usize {
        let mut clients = self.clients.write().await;
        let mut claimed = 0;
        for controller in clients.values_mut() {
            if controller.as_deref() != Some(tag.name()) {
                *controller = Some(tag.name().to_string());
                claimed += 1;
            }
        }
        claimed
    }
}
