//! worker_status tool implementation.

use super::json_result;
use hoard_client::{ActivationReport, InstallReport, Worker, WorkerState};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output from the worker_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerStatusOutput {
    pub state: WorkerState,
    pub tag: String,
    pub manifest_entries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install: Option<InstallReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation: Option<ActivationReport>,
}

/// Implementation of the worker_status tool.
pub async fn status_impl(worker: &Worker) -> Result<CallToolResult, McpError> {
    let output = WorkerStatusOutput {
        state: worker.state().await,
        tag: worker.tag().name().to_string(),
        manifest_entries: worker.manifest().len(),
        install: worker.install_report().await,
        activation: worker.activation_report().await,
    };
    json_result(&output)
}
