//! docent MCP server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use docent_client::{CrawlerClient, CrawlerConfig, WeaviateClient, WeaviateConfig};
use docent_core::cache::spawn_sweeper;
use docent_core::{AppConfig, AppState, open_store};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

mod handler;
mod instrument;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    tracing::info!(
        weaviate = %config.weaviate_url,
        crawler = %config.crawler_api_url,
        cache = ?config.cache_backend,
        "Starting docent server on stdio transport"
    );

    let weaviate = WeaviateClient::new(WeaviateConfig::from(&config))?;
    let crawler = CrawlerClient::new(CrawlerConfig::from(&config))?;
    let store = open_store(&config).await.context("failed to open cache store")?;

    let shutdown = CancellationToken::new();
    let sweeper = spawn_sweeper(store.clone(), config.cache_sweep_interval(), shutdown.clone());

    let state = AppState::new(config, Arc::new(weaviate), Arc::new(crawler), store);
    let handler = handler::DocentServer::new(state);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    shutdown.cancel();
    sweeper.await?;
    tracing::info!("docent server stopped");

    Ok(())
}
