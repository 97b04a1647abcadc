//! docs_search tool implementation.
//!
//! Semantic search over indexed documentation. Unfiltered queries go through
//! the cache; filtered queries always reach the vector store.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;
use docent_core::search::DEFAULT_SEARCH_LIMIT;
use docent_core::{AppState, SearchFilters};

/// Input parameters for docs_search tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DocsSearchParams {
    /// The search query (required).
    pub query: String,

    /// Maximum number of results (1-100, default 20).
    #[serde(default)]
    pub limit: Option<usize>,

    /// Only return documents from this source, e.g. "docs.crawl4ai.com".
    #[serde(default)]
    pub source: Option<String>,

    /// Only return documents for this version, e.g. "latest".
    #[serde(default)]
    pub version: Option<String>,

    /// Additional equality filters on title, url, source or version.
    #[serde(default)]
    pub filters: Option<SearchFilters>,
}

impl DocsSearchParams {
    /// Merge the convenience fields into the filter map; `None` when nothing filters.
    fn merged_filters(&self) -> Option<SearchFilters> {
        let mut filters = self.filters.clone().unwrap_or_default();
        if let Some(source) = &self.source {
            filters.insert("source".into(), source.clone());
        }
        if let Some(version) = &self.version {
            filters.insert("version".into(), version.clone());
        }

        (!filters.is_empty()).then_some(filters)
    }
}

/// Implementation of the docs_search tool.
pub async fn search_impl(state: &AppState, params: DocsSearchParams) -> Result<CallToolResult, McpError> {
    let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    let filters = params.merged_filters();

    let result = state.search.search(&params.query, limit, filters.as_ref()).await?;

    json_result(&result)
}
