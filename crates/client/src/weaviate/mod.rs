//! Weaviate vector store client.
//!
//! ### Endpoints
//!
//! - **Search**: `POST {url}/v1/graphql` with a `Get { Documentation(nearText, limit, where) }` query.
//! - **Lookup**: `GET {url}/v1/objects/Documentation/{id}`; a 404 means the id is unknown.
//! - **Authentication**: optional `Authorization: Bearer <key>`; an OpenAI key is forwarded
//!   as `X-OpenAI-Api-Key` for the `text2vec-openai` vectorizer.

pub mod query;
pub mod response;

pub use query::{DOC_CLASS_NAME, FILTERABLE_FIELDS, build_search_query};
pub use response::{GraphQlResponse, ObjectResponse};

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use url::Url;

use crate::ClientError;
use crate::http::{build_http, endpoint, parse_base_url, read_json, transport_error};
use docent_core::{AppConfig, BackendError, Document, SearchBackend, SearchFilters, SearchResult};

/// Weaviate client configuration.
#[derive(Debug, Clone)]
pub struct WeaviateConfig {
    /// Base URL (default: http://localhost:8080).
    pub url: String,
    pub api_key: Option<String>,
    pub openai_api_key: Option<String>,
    /// Request timeout (default: 60s).
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for WeaviateConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
            api_key: None,
            openai_api_key: None,
            timeout: Duration::from_secs(60),
            user_agent: "docent/0.1".to_string(),
        }
    }
}

impl From<&AppConfig> for WeaviateConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            url: config.weaviate_url.clone(),
            api_key: config.weaviate_api_key.clone(),
            openai_api_key: config.openai_api_key.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

fn auth_headers(config: &WeaviateConfig) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

    if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
        let mut value =
            HeaderValue::from_str(&format!("Bearer {key}")).map_err(|_| ClientError::InvalidHeader("Authorization"))?;
        value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, value);
    }

    if let Some(key) = config.openai_api_key.as_deref().filter(|k| !k.is_empty()) {
        let mut value = HeaderValue::from_str(key).map_err(|_| ClientError::InvalidHeader("X-OpenAI-Api-Key"))?;
        value.set_sensitive(true);
        headers.insert("X-OpenAI-Api-Key", value);
    }

    Ok(headers)
}

/// Weaviate client implementing [`SearchBackend`].
#[derive(Debug, Clone)]
pub struct WeaviateClient {
    http: Client,
    base_url: Url,
}

impl WeaviateClient {
    pub fn new(config: WeaviateConfig) -> Result<Self, ClientError> {
        let base_url = parse_base_url(&config.url)?;
        let http = build_http(&config.user_agent, config.timeout, auth_headers(&config)?)?;

        tracing::debug!(url = %base_url, "weaviate client ready");
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn graphql_url(&self) -> Url {
        endpoint(&self.base_url, &["v1", "graphql"])
    }

    fn object_url(&self, id: &str) -> Url {
        endpoint(&self.base_url, &["v1", "objects", DOC_CLASS_NAME, id])
    }
}

#[async_trait]
impl SearchBackend for WeaviateClient {
    async fn search(
        &self, concepts: &[String], limit: usize, filters: Option<&SearchFilters>,
    ) -> Result<SearchResult, BackendError> {
        let start = Instant::now();
        let query = build_search_query(concepts, limit, filters);
        tracing::debug!(?concepts, limit, "searching weaviate");

        let response = self
            .http
            .post(self.graphql_url())
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await
            .map_err(transport_error)?;

        let body: GraphQlResponse = read_json(response).await?;
        let result = body.into_search_result()?;

        tracing::debug!("search completed in {:?}, {} results", start.elapsed(), result.total);
        Ok(result)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Document>, BackendError> {
        tracing::debug!(id, "fetching document from weaviate");

        let response = self.http.get(self.object_url(id)).send().await.map_err(transport_error)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body: ObjectResponse = read_json(response).await?;
        Ok(body.into_document(id))
    }
}
