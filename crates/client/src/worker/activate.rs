//! Activate step: take over open clients and drop stale generations.

use super::host::Host;
use hoard_core::{CacheDb, VersionTag};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Outcome of an activation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ActivationReport {
    /// Generation that is now current.
    pub current: String,
    /// Clients that switched to this generation.
    pub claimed_clients: usize,
    /// Stale generations removed.
    pub deleted: Vec<String>,
    /// Stale generations that could not be removed (retried on next activation).
    pub failed: Vec<String>,
}

/// Claim every client, then delete every store this application owns that is
/// not `current`.
///
/// Stores without the application prefix are never touched. A failed
/// deletion leaves a stale store behind, which costs space but is never read.
pub async fn activate(db: &CacheDb, current: &VersionTag, host: &dyn Host) -> ActivationReport {
    let claimed_clients = host.claim_clients(current).await;
    tracing::info!(current = current.name(), claimed_clients, "claimed clients");

    let mut report = ActivationReport { current: current.name().to_string(), claimed_clients, ..Default::default() };

    let tags = match db.list_store_tags().await {
        Ok(tags) => tags,
        Err(e) => {
            tracing::warn!("failed to list cache stores, skipping cleanup: {}", e);
            return report;
        }
    };

    for tag in tags.into_iter().filter(|t| current.supersedes(t)) {
        match db.delete_store(&tag).await {
            Ok(_) => {
                tracing::info!("removed old cache {}", tag);
                report.deleted.push(tag);
            }
            Err(e) => {
                tracing::warn!("failed to remove old cache {}: {}", tag, e);
                report.failed.push(tag);
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::host::ClientRegistry;

    #[tokio::test]
    async fn test_activate_removes_only_stale_generations() {
        let db = CacheDb::open_in_memory().await.unwrap();
        for name in ["hoard-cache-v1", "hoard-cache-v2", "other-cache-v1"] {
            db.open_store(name).await.unwrap();
        }
        let host = ClientRegistry::new();

        let report = activate(&db, &VersionTag::new("hoard", 2), &host).await;

        assert_eq!(report.deleted, vec!["hoard-cache-v1"]);
        assert!(report.failed.is_empty());
        assert_eq!(
            db.list_store_tags().await.unwrap(),
            vec!["hoard-cache-v2".to_string(), "other-cache-v1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_activate_claims_clients() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let old = VersionTag::new("hoard", 1);
        let new = VersionTag::new("hoard", 2);
        let host = ClientRegistry::new();
        host.connect("tab-1", Some(&old)).await;
        host.connect("tab-2", Some(&old)).await;

        let report = activate(&db, &new, &host).await;

        assert_eq!(report.claimed_clients, 2);
        assert_eq!(host.controller("tab-1").await.as_deref(), Some("hoard-cache-v2"));
    }

    #[tokio::test]
    async fn test_activate_with_nothing_to_clean() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_store("hoard-cache-v3").await.unwrap();

        let report = activate(&db, &VersionTag::new("hoard", 3), &ClientRegistry::new()).await;

        assert_eq!(report.current, "hoard-cache-v3");
        assert!(report.deleted.is_empty());
        assert_eq!(db.list_store_tags().await.unwrap().len(), 1);
    }
}
