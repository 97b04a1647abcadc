//! MCP server handler implementation.
//!
//! This module defines the main server handler that routes tool calls to the
//! appropriate implementations. Every `tools/call` is timed through
//! [`RequestTimer`], keyed by tool name.
use crate::instrument::{RequestTimer, STATUS_ERROR, STATUS_OK};
use crate::tools::{
    cache::purge_impl,
    crawl::{Crawl4aiDocsParams, CrawlStartParams, CrawlStatusParams, crawl4ai_docs_impl, start_impl, status_impl},
    docs::{DocsGetParams, DocsSearchParams, get_impl, search_impl},
    health::health_impl,
    metrics::{MetricsSamplesParams, samples_impl, summary_impl},
};

use docent_core::AppState;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for docent.
#[derive(Clone)]
pub struct DocentServer {
    state: AppState,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl DocentServer {
    pub fn new(state: AppState) -> Self {
        Self { state, tool_router: Self::tool_router() }
    }

    #[tool(description = "Semantic search over indexed documentation. Returns matching chunks with relevance scores.")]
    async fn docs_search(&self, params: Parameters<DocsSearchParams>) -> Result<CallToolResult, McpError> {
        search_impl(&self.state, params.0).await
    }

    #[tool(description = "Fetch one documentation chunk by id.")]
    async fn docs_get(&self, params: Parameters<DocsGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.state, params.0).await
    }

    #[tool(description = "Start crawling a documentation website. Returns the crawl job; poll it with crawl_status.")]
    async fn crawl_start(&self, params: Parameters<CrawlStartParams>) -> Result<CallToolResult, McpError> {
        start_impl(&self.state, params.0).await
    }

    #[tool(description = "Current status of a crawl job: pending, processing, completed or failed.")]
    async fn crawl_status(&self, params: Parameters<CrawlStatusParams>) -> Result<CallToolResult, McpError> {
        status_impl(&self.state, params.0).await
    }

    #[tool(description = "Crawl the Crawl4AI documentation and index it.")]
    async fn crawl_crawl4ai_docs(&self, params: Parameters<Crawl4aiDocsParams>) -> Result<CallToolResult, McpError> {
        crawl4ai_docs_impl(&self.state, params.0).await
    }

    #[tool(description = "Request timing aggregates per tool: count, average, min and max duration in milliseconds.")]
    async fn metrics_summary(&self) -> Result<CallToolResult, McpError> {
        summary_impl(&self.state).await
    }

    #[tool(description = "Raw request timing samples, optionally filtered by tool name (path) and method, \
                          with their average duration in milliseconds.")]
    async fn metrics_samples(&self, params: Parameters<MetricsSamplesParams>) -> Result<CallToolResult, McpError> {
        samples_impl(&self.state, params.0).await
    }

    #[tool(description = "Remove expired entries from the search cache.")]
    async fn cache_purge(&self) -> Result<CallToolResult, McpError> {
        purge_impl(&self.state).await
    }

    #[tool(description = "Liveness check with service name, version and timestamp.")]
    async fn health(&self) -> Result<CallToolResult, McpError> {
        health_impl().await
    }
}

/// Status recorded for a finished tool call.
fn status_for(result: &Result<CallToolResult, McpError>) -> u16 {
    match result {
        Ok(output) if output.is_error != Some(true) => STATUS_OK,
        _ => STATUS_ERROR,
    }
}

impl ServerHandler for DocentServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "docent".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Search crawled documentation with docs_search and docs_get; index new sites with crawl_start \
                 and follow progress with crawl_status."
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        let timer = RequestTimer::start(self.state.metrics.clone(), "tools/call", request.name.to_string());

        let result = self
            .tool_router
            .call(ToolCallContext::new(self, request, context))
            .await;

        timer.finish(status_for(&result));
        result
    }
}
