//! crawl_start tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;
use docent_core::{AppState, CrawlRequest};

/// Parameters for the crawl_start tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CrawlStartParams {
    /// Base URL of the documentation site (http or https).
    pub url: String,

    /// Maximum number of pages to crawl (1-1000, default 100).
    #[serde(default)]
    pub max_pages: Option<u32>,

    /// Only crawl URLs matching these patterns.
    #[serde(default)]
    pub include_patterns: Option<Vec<String>>,

    /// Skip URLs matching these patterns.
    #[serde(default)]
    pub exclude_patterns: Option<Vec<String>>,

    /// Generate page summaries after crawling (default true).
    #[serde(default)]
    pub generate_summaries: Option<bool>,
}

impl From<CrawlStartParams> for CrawlRequest {
    fn from(params: CrawlStartParams) -> Self {
        let mut request = CrawlRequest::new(params.url);
        if let Some(max_pages) = params.max_pages {
            request.max_pages = max_pages;
        }
        if let Some(generate_summaries) = params.generate_summaries {
            request.generate_summaries = generate_summaries;
        }
        request.include_patterns = params.include_patterns;
        request.exclude_patterns = params.exclude_patterns;
        request
    }
}

/// Implementation of the crawl_start tool.
pub async fn start_impl(state: &AppState, params: CrawlStartParams) -> Result<CallToolResult, McpError> {
    let job = state.crawl.submit(&params.into()).await?;
    json_result(&job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{fixture, output_json};
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_start_crawl() {
        let fx = fixture();
        let params = CrawlStartParams { url: "https://docs.example.com".into(), max_pages: Some(2), ..Default::default() };

        let output = output_json(&start_impl(&fx.state, params).await.unwrap());
        assert_eq!(output["jobId"], "job-1");
        assert_eq!(output["status"], "pending");
        assert_eq!(output["url"], "https://docs.example.com");
    }

    #[tokio::test]
    async fn test_invalid_url_not_submitted() {
        let fx = fixture();
        let params = CrawlStartParams { url: "file:///etc/passwd".into(), ..Default::default() };

        let err = start_impl(&fx.state, params).await.unwrap_err();
        assert_eq!(err.code.0, -32003);
        assert_eq!(fx.crawler.submits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_params_to_request_defaults() {
        let request = CrawlRequest::from(CrawlStartParams { url: "https://a.dev".into(), ..Default::default() });
        assert_eq!(request.max_pages, 100);
        assert!(request.generate_summaries);
    }
}
