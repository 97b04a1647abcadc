//! cache_purge tool implementation.
//!
//! Sweeps expired entries from the search cache. Live entries are untouched.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;
use docent_core::AppState;

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Number of expired entries deleted.
    pub deleted: u64,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(state: &AppState) -> Result<CallToolResult, McpError> {
    let deleted = state.store().purge_expired().await?;
    tracing::info!(deleted, "purged expired cache entries");

    json_result(&CachePurgeOutput { deleted })
}
