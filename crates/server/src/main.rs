//! hoard worker entry point.
//!
//! Loads configuration, brings the cache generation up (install, then
//! activate) and serves the interceptor as MCP tools on stdio.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use hoard_client::{ClientRegistry, FetchConfig, HttpFetcher, Worker};
use hoard_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

/// Client id under which the MCP session is registered with the host.
const SESSION_CLIENT: &str = "mcp-session";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let db = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("failed to open cache database {}", config.db_path.display()))?;

    let fetch_config = FetchConfig {
        user_agent: config.user_agent.clone(),
        max_bytes: config.max_bytes,
        timeout: config.timeout(),
        ..FetchConfig::new(config.base_url()?)
    };
    let fetcher = Arc::new(HttpFetcher::new(fetch_config)?);

    let host = Arc::new(ClientRegistry::new());
    host.connect(SESSION_CLIENT, None).await;

    let worker = Arc::new(Worker::new(&config, db, fetcher, host)?);
    let (installed, activated) = worker.start().await?;
    tracing::info!(
        tag = worker.tag().name(),
        cached = installed.cached.len(),
        skipped = installed.skipped.len(),
        removed = activated.deleted.len(),
        "worker active"
    );

    tracing::info!("Starting hoard MCP server on stdio transport");

    let handler = handler::HoardServer::new(worker);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
