//! cache_stores tool implementation.

use crate::tools::json_result;
use hoard_client::Worker;
use hoard_core::StoreSummary;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output from the cache_stores tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStoresOutput {
    /// Generation the worker serves from.
    pub current: String,
    /// Every persisted generation, oldest first.
    pub stores: Vec<StoreSummary>,
}

/// Implementation of the cache_stores tool.
pub async fn stores_impl(worker: &Worker) -> Result<CallToolResult, McpError> {
    let stores = worker.db().store_summaries().await?;
    let output = CacheStoresOutput { current: worker.tag().name().to_string(), stores };
    json_result(&output)
}
