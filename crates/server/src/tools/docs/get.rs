//! docs_get tool implementation.
//!
//! Retrieves one documentation chunk by id, cache first.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;
use docent_core::AppState;

/// Parameters for the docs_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DocsGetParams {
    /// Document id as returned by docs_search.
    pub id: String,
}

/// Implementation of the docs_get tool.
pub async fn get_impl(state: &AppState, params: DocsGetParams) -> Result<CallToolResult, McpError> {
    let document = state.search.get_document_by_id(&params.id).await?;
    json_result(&document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{fixture, output_json};

    #[tokio::test]
    async fn test_get_found() {
        let fx = fixture();
        let result = get_impl(&fx.state, DocsGetParams { id: "doc-1".into() }).await.unwrap();
        let output = output_json(&result);

        assert_eq!(output["id"], "doc-1");
        assert_eq!(output["metadata"]["title"], "Doc doc-1");
        assert!(output.get("score").is_none());
    }

    #[tokio::test]
    async fn test_get_missing() {
        let fx = fixture();
        let err = get_impl(&fx.state, DocsGetParams { id: "missing-id".into() }).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }
}
