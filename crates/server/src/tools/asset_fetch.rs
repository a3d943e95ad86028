//! asset_fetch tool implementation.
//!
//! Routes a request through the worker exactly as the application would see it.

use super::json_result;
use hoard_client::{ResponseSource, Worker};
use hoard_core::{CapturedResponse, ResponseKind};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the asset_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetFetchParams {
    /// Request identifier, relative to the app origin or absolute.
    pub url: String,

    /// Treat the request as a page navigation (offline navigations get the app shell).
    #[serde(default)]
    pub navigate: bool,
}

/// A response as returned to MCP clients.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResponseView {
    pub status: u16,
    pub status_text: String,
    pub kind: ResponseKind,
    pub headers: Vec<(String, String)>,
    /// Body as text; omitted when it is not valid UTF-8.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub body_bytes: usize,
}

impl From<&CapturedResponse> for ResponseView {
    fn from(response: &CapturedResponse) -> Self {
        Self {
            status: response.status,
            status_text: response.status_text.clone(),
            kind: response.kind,
            headers: response.headers.clone(),
            body: response.text().map(str::to_string),
            body_bytes: response.body.len(),
        }
    }
}

/// Output from the asset_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetFetchOutput {
    /// Canonical URL the request was keyed under.
    pub url: String,
    pub source: ResponseSource,
    #[serde(flatten)]
    pub response: ResponseView,
}

/// Implementation of the asset_fetch tool.
pub async fn fetch_impl(worker: &Worker, params: AssetFetchParams) -> Result<CallToolResult, McpError> {
    let mut request = worker.request(&params.url)?;
    if params.navigate {
        request = request.navigate();
    }

    let resolution = worker.handle_fetch(&request).await?;
    let output = AssetFetchOutput {
        url: request.key().to_string(),
        source: resolution.source,
        response: ResponseView::from(&resolution.response),
    };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{ShellOnly, active_worker, output_text};
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_fetch_impl_serves_cached_shell() {
        let fetcher = Arc::new(ShellOnly::default());
        let worker = active_worker(fetcher.clone()).await;
        fetcher.offline.store(true, Ordering::SeqCst);

        let params = AssetFetchParams { url: "/index.html".into(), navigate: false };
        let result = fetch_impl(&worker, params).await.unwrap();
        let output: AssetFetchOutput = serde_json::from_str(&output_text(&result)).unwrap();

        assert_eq!(output.url, "https://app.test/index.html");
        assert_eq!(output.source, ResponseSource::Cache);
        assert_eq!(output.response.status, 200);
        assert_eq!(output.response.body.as_deref(), Some("<html>shell</html>"));
        assert_eq!(output.response.body_bytes, 18);
    }

    #[tokio::test]
    async fn test_fetch_impl_offline_miss_falls_back() {
        let worker = active_worker(Arc::new(ShellOnly::default())).await;

        let params = AssetFetchParams { url: "./app.js".into(), navigate: false };
        let result = fetch_impl(&worker, params).await.unwrap();
        let output: AssetFetchOutput = serde_json::from_str(&output_text(&result)).unwrap();

        assert_eq!(output.source, ResponseSource::Fallback);
        assert_eq!(output.response.status, 503);
        assert_eq!(output.response.body.as_deref(), Some("Offline mode - resource unavailable"));
    }

    #[tokio::test]
    async fn test_fetch_impl_offline_navigation_gets_shell() {
        let worker = active_worker(Arc::new(ShellOnly::default())).await;

        let params = AssetFetchParams { url: "/counters/42".into(), navigate: true };
        let result = fetch_impl(&worker, params).await.unwrap();
        let output: AssetFetchOutput = serde_json::from_str(&output_text(&result)).unwrap();

        assert_eq!(output.source, ResponseSource::Cache);
        assert_eq!(output.response.body.as_deref(), Some("<html>shell</html>"));
    }

    #[tokio::test]
    async fn test_fetch_impl_rejects_bad_scheme() {
        let worker = active_worker(Arc::new(ShellOnly::default())).await;

        let params = AssetFetchParams { url: "ftp://files.test/a".into(), navigate: false };
        let err = fetch_impl(&worker, params).await.unwrap_err();
        assert_eq!(err.code.0, -32003);
    }

    #[test]
    fn test_params_navigate_defaults_false() {
        let params: AssetFetchParams = serde_json::from_str(r#"{"url": "./"}"#).unwrap();
        assert!(!params.navigate);
    }
}
