//! Weaviate response payloads and their conversion into the core model.

use serde::Deserialize;

use docent_core::{BackendError, Document, DocumentMetadata, SearchResult};

const DEFAULT_TITLE: &str = "Untitled";
const DEFAULT_VERSION: &str = "latest";

/// Body of a `POST /v1/graphql` response.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<GraphQlData>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlData {
    #[serde(rename = "Get", default)]
    pub get: Option<GetData>,
}

#[derive(Debug, Deserialize)]
pub struct GetData {
    #[serde(rename = "Documentation", default)]
    pub documentation: Option<Vec<RawDocument>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

/// One hit as returned by `Get { Documentation }`.
#[derive(Debug, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(rename = "_additional")]
    pub additional: Additional,
}

#[derive(Debug, Deserialize)]
pub struct Additional {
    pub id: String,
    #[serde(default)]
    pub certainty: Option<f64>,
}

/// Body of a `GET /v1/objects/{class}/{id}` response.
#[derive(Debug, Deserialize)]
pub struct ObjectResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub properties: Option<ObjectProperties>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ObjectProperties {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

fn metadata(title: Option<String>, url: Option<String>, source: Option<String>, version: Option<String>) -> DocumentMetadata {
    DocumentMetadata {
        title: title.filter(|t| !t.is_empty()).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        url: url.unwrap_or_default(),
        source: source.unwrap_or_default(),
        version: Some(version.filter(|v| !v.is_empty()).unwrap_or_else(|| DEFAULT_VERSION.to_string())),
        last_updated: None,
    }
}

impl GraphQlResponse {
    /// GraphQL errors are reported in a 200 response, so they surface as a rejection.
    pub fn into_search_result(self) -> Result<SearchResult, BackendError> {
        if !self.errors.is_empty() {
            let message = self.errors.into_iter().map(|e| e.message).collect::<Vec<_>>().join("; ");
            return Err(BackendError::Rejected { status: 200, message });
        }

        let hits = self.data.and_then(|d| d.get).and_then(|g| g.documentation).unwrap_or_default();
        let documents = hits.into_iter().map(Document::from).collect();

        Ok(SearchResult::new(documents))
    }
}

impl From<RawDocument> for Document {
    fn from(raw: RawDocument) -> Self {
        Document {
            id: raw.additional.id,
            content: raw.content.unwrap_or_default(),
            metadata: metadata(raw.title, raw.url, raw.source, raw.version),
            score: Some(raw.additional.certainty.unwrap_or(0.0)),
        }
    }
}

impl ObjectResponse {
    /// An object without properties is treated as absent.
    pub fn into_document(self, requested_id: &str) -> Option<Document> {
        let props = self.properties?;
        Some(Document {
            id: self.id.unwrap_or_else(|| requested_id.to_string()),
            content: props.content.unwrap_or_default(),
            metadata: metadata(props.title, props.url, props.source, props.version),
            score: None,
        })
    }
}
