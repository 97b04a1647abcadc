//! crawl_crawl4ai_docs tool implementation.
//!
//! Starts the crawler's preset crawl of the Crawl4AI documentation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;
use docent_core::AppState;
use docent_core::model::DEFAULT_MAX_PAGES;

/// Parameters for the crawl_crawl4ai_docs tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Crawl4aiDocsParams {
    /// Maximum number of pages to crawl (1-1000, default 100).
    #[serde(default)]
    pub max_pages: Option<u32>,

    /// Generate page summaries after crawling (default true).
    #[serde(default)]
    pub generate_summaries: Option<bool>,
}

/// Implementation of the crawl_crawl4ai_docs tool.
pub async fn crawl4ai_docs_impl(state: &AppState, params: Crawl4aiDocsParams) -> Result<CallToolResult, McpError> {
    let max_pages = params.max_pages.unwrap_or(DEFAULT_MAX_PAGES);
    let generate_summaries = params.generate_summaries.unwrap_or(true);

    let job = state.crawl.submit_crawl4ai_docs(max_pages, generate_summaries).await?;
    json_result(&job)
}
