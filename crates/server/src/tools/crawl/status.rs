//! crawl_status tool implementation.
//!
//! A single status read. Clients re-call it until the job is terminal.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;
use docent_core::AppState;

/// Parameters for the crawl_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CrawlStatusParams {
    /// Job id returned by crawl_start or crawl_crawl4ai_docs.
    pub job_id: String,
}

/// Implementation of the crawl_status tool.
pub async fn status_impl(state: &AppState, params: CrawlStatusParams) -> Result<CallToolResult, McpError> {
    let job = state.crawl.poll(&params.job_id).await?;
    json_result(&job)
}
