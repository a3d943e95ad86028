//! cache_match tool implementation.
//!
//! Looks up an entry in the current generation without touching the network.

use crate::tools::asset_fetch::ResponseView;
use crate::tools::json_result;
use hoard_client::Worker;
use hoard_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the cache_match tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheMatchParams {
    /// Request identifier, relative to the app origin or absolute.
    pub url: String,
}

/// Output from the cache_match tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheMatchOutput {
    pub store: String,
    pub url: String,
    #[serde(flatten)]
    pub response: ResponseView,
}

/// Implementation of the cache_match tool.
pub async fn match_impl(worker: &Worker, params: CacheMatchParams) -> Result<CallToolResult, McpError> {
    let request = worker.request(&params.url)?;
    let store = worker
        .store()
        .ok_or_else(|| Error::Lifecycle(format!("{} has not been installed", worker.tag())))?;

    let response = store
        .match_request(request.key())
        .await?
        .ok_or_else(|| Error::CacheMiss(request.key().to_string()))?;

    let output = CacheMatchOutput {
        store: store.name().to_string(),
        url: request.key().to_string(),
        response: ResponseView::from(&response),
    };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{ShellOnly, active_worker, output_text};
    use hoard_client::ClientRegistry;
    use hoard_core::{AppConfig, CacheDb};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_match_impl_found() {
        let worker = active_worker(Arc::new(ShellOnly::default())).await;

        let params = CacheMatchParams { url: "./index.html".into() };
        let result = match_impl(&worker, params).await.unwrap();
        let output: CacheMatchOutput = serde_json::from_str(&output_text(&result)).unwrap();

        assert_eq!(output.store, "hoard-cache-v1");
        assert_eq!(output.url, "https://app.test/index.html");
        assert!(output.response.headers.contains(&("content-type".into(), "text/html".into())));
    }

    #[tokio::test]
    async fn test_match_impl_missing() {
        let worker = active_worker(Arc::new(ShellOnly::default())).await;

        let params = CacheMatchParams { url: "./app.js".into() };
        let err = match_impl(&worker, params).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
        assert!(err.message.contains("https://app.test/app.js"));
    }

    #[tokio::test]
    async fn test_match_impl_before_install() {
        let config = AppConfig { app_origin: "https://app.test/".into(), ..Default::default() };
        let db = CacheDb::open_in_memory().await.unwrap();
        let worker =
            hoard_client::Worker::new(&config, db, Arc::new(ShellOnly::default()), Arc::new(ClientRegistry::new()))
                .unwrap();

        let params = CacheMatchParams { url: "./index.html".into() };
        let err = match_impl(&worker, params).await.unwrap_err();
        assert_eq!(err.code.0, -32009);
    }
}
