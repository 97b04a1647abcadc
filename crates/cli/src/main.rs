//! docent command-line client.
//!
//! Runs the same search, lookup and crawl operations as the MCP server,
//! directly against the configured Weaviate and crawler services.
//! Results go to stdout as JSON; logs go to stderr.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use docent_client::{CrawlerClient, CrawlerConfig, WeaviateClient, WeaviateConfig};
use docent_core::{AppConfig, AppState, open_store};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "docent", version, about = "Search and crawl documentation indexed in Weaviate")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Semantic search over indexed documentation
    Search(SearchArgs),
    /// Fetch one document by id
    Doc {
        id: String,
    },
    /// Crawl a documentation site and follow the job until it finishes
    Crawl(CrawlArgs),
    /// Crawl the Crawl4AI documentation
    Crawl4ai(Crawl4aiArgs),
    /// Show the current status of a crawl job
    Status {
        job_id: String,
    },
    /// Remove expired entries from the cache store
    Purge,
}

#[derive(Debug, Args)]
struct SearchArgs {
    query: String,

    /// Maximum number of results (1-100)
    #[arg(short, long, default_value_t = 20)]
    limit: usize,

    /// Only return documents from this source
    #[arg(long)]
    source: Option<String>,

    /// Only return documents for this version
    #[arg(long = "doc-version")]
    doc_version: Option<String>,
}

#[derive(Debug, Args)]
struct CrawlArgs {
    url: String,

    /// Maximum number of pages to crawl (1-1000)
    #[arg(long, default_value_t = 100)]
    max_pages: u32,

    /// Only crawl URLs matching this pattern (repeatable)
    #[arg(long = "include")]
    include: Vec<String>,

    /// Skip URLs matching this pattern (repeatable)
    #[arg(long = "exclude")]
    exclude: Vec<String>,

    /// Do not generate page summaries
    #[arg(long)]
    no_summaries: bool,

    /// Print the submitted job and exit instead of polling
    #[arg(long)]
    no_wait: bool,
}

#[derive(Debug, Args)]
struct Crawl4aiArgs {
    /// Maximum number of pages to crawl (1-1000)
    #[arg(long, default_value_t = 100)]
    max_pages: u32,

    /// Do not generate page summaries
    #[arg(long)]
    no_summaries: bool,

    /// Print the submitted job and exit instead of polling
    #[arg(long)]
    no_wait: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn build_state(config: AppConfig) -> Result<AppState> {
    let weaviate = WeaviateClient::new(WeaviateConfig::from(&config))?;
    let crawler = CrawlerClient::new(CrawlerConfig::from(&config))?;
    let store = open_store(&config).await.context("failed to open cache store")?;

    Ok(AppState::new(config, Arc::new(weaviate), Arc::new(crawler), store))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = AppConfig::load().context("failed to load configuration")?;
    let state = build_state(config).await?;

    match cli.command {
        Command::Search(args) => commands::search(&state, args).await,
        Command::Doc { id } => commands::doc(&state, &id).await,
        Command::Crawl(args) => commands::crawl(&state, args).await,
        Command::Crawl4ai(args) => commands::crawl4ai(&state, args).await,
        Command::Status { job_id } => commands::status(&state, &job_id).await,
        Command::Purge => commands::purge(&state).await,
    }
}
