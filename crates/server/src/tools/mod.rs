//! MCP tool implementations.
//!
//! This module contains all tools exposed by the docent server. Each tool
//! has a `*Params` input type and an `*_impl` function taking the shared
//! [`AppState`](docent_core::AppState).

pub mod cache;
pub mod crawl;
pub mod docs;
pub mod health;
pub mod metrics;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

/// Render `output` as a pretty-printed JSON text result.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| McpError::internal_error(format!("failed to serialize output: {e}"), None))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
