//! Crawler service client.
//!
//! ### Endpoints
//!
//! - `POST {api}/crawl`: submit `{url, maxPages, includePatterns?, excludePatterns?, generateSummaries}`
//! - `GET {api}/crawl/{jobId}`: job status; a 404 means the id is unknown
//! - `POST {api}/crawl/crawl4ai-docs`: preset crawl of the Crawl4AI documentation

pub mod response;

pub use response::{CrawlJobPayload, parse_status};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use url::Url;

use crate::ClientError;
use crate::http::{build_http, endpoint, parse_base_url, read_json, transport_error};
use docent_core::{AppConfig, BackendError, CrawlBackend, CrawlJob, CrawlRequest};

/// Crawler client configuration.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// API base URL (default: http://crawler:3000/api/v1).
    pub api_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            api_url: "http://crawler:3000/api/v1".to_string(),
            timeout: Duration::from_secs(60),
            user_agent: "docent/0.1".to_string(),
        }
    }
}

impl From<&AppConfig> for CrawlerConfig {
    fn from(config: &AppConfig) -> Self {
        Self { api_url: config.crawler_api_url.clone(), timeout: config.timeout(), user_agent: config.user_agent.clone() }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Crawl4AiDocsBody {
    max_pages: u32,
    generate_summaries: bool,
}

/// Crawler client implementing [`CrawlBackend`].
#[derive(Debug, Clone)]
pub struct CrawlerClient {
    http: Client,
    base_url: Url,
}

impl CrawlerClient {
    pub fn new(config: CrawlerConfig) -> Result<Self, ClientError> {
        let base_url = parse_base_url(&config.api_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let http = build_http(&config.user_agent, config.timeout, headers)?;

        tracing::debug!(url = %base_url, "crawler client ready");
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn crawl_url(&self) -> Url {
        endpoint(&self.base_url, &["crawl"])
    }

    fn job_url(&self, job_id: &str) -> Url {
        endpoint(&self.base_url, &["crawl", job_id])
    }

    fn crawl4ai_url(&self) -> Url {
        endpoint(&self.base_url, &["crawl", "crawl4ai-docs"])
    }
}

#[async_trait]
impl CrawlBackend for CrawlerClient {
    async fn submit(&self, request: &CrawlRequest) -> Result<CrawlJob, BackendError> {
        tracing::debug!(url = %request.url, max_pages = request.max_pages, "submitting crawl");

        let response = self.http.post(self.crawl_url()).json(request).send().await.map_err(transport_error)?;
        let payload: CrawlJobPayload = read_json(response).await?;

        payload.into_job(Some(&request.url))
    }

    async fn status(&self, job_id: &str) -> Result<Option<CrawlJob>, BackendError> {
        let response = self.http.get(self.job_url(job_id)).send().await.map_err(transport_error)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let payload: CrawlJobPayload = read_json(response).await?;
        let job = payload.into_job(None)?;

        tracing::debug!(job_id, status = %job.status, "crawl status");
        Ok(Some(job))
    }

    async fn submit_crawl4ai_docs(&self, max_pages: u32, generate_summaries: bool) -> Result<CrawlJob, BackendError> {
        let body = Crawl4AiDocsBody { max_pages, generate_summaries };

        let response = self.http.post(self.crawl4ai_url()).json(&body).send().await.map_err(transport_error)?;
        let payload: CrawlJobPayload = read_json(response).await?;

        payload.into_job(None)
    }
}
