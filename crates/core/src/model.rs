//! Data model shared by the cache, crawl and metrics subsystems.
//!
//! These are the canonical shapes returned to the presentation layer.
//! Wire-format quirks of the collaborators are handled in `docent-client`.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Search filters keyed by document field (e.g. `source`, `version`).
pub type SearchFilters = BTreeMap<String, String>;

/// Metadata attached to every indexed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub title: String,
    pub url: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

/// A documentation chunk stored in the vector index.
///
/// `score` is only populated by search; lookups by id leave it empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    pub metadata: DocumentMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Result of a semantic search.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResult {
    pub documents: Vec<Document>,
    pub total: usize,
}

impl SearchResult {
    pub fn new(documents: Vec<Document>) -> Self {
        let total = documents.len();
        Self { documents, total }
    }
}

/// Lifecycle state of a crawl job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Terminal states admit no further transition.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Position along `pending -> processing -> terminal`.
    pub fn rank(self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::Processing => 1,
            JobStatus::Completed | JobStatus::Failed => 2,
        }
    }

    /// Whether observing `next` after `self` would move the job backwards.
    pub fn regresses_to(self, next: JobStatus) -> bool {
        if self.is_terminal() {
            return next != self;
        }
        next.rank() < self.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A crawl job as reported by the crawler service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlJob {
    pub job_id: String,
    pub url: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summarized_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CrawlJob {
    /// Enforce `error.is_some() == (status == Failed)`.
    ///
    /// A failed job without an error message borrows `message`, or gets a
    /// generic one; an error reported alongside a non-failed status is dropped.
    pub fn normalized(mut self) -> Self {
        if self.status == JobStatus::Failed {
            if self.error.is_none() {
                self.error = Some(self.message.clone().unwrap_or_else(|| "crawl failed".to_string()));
            }
        } else {
            self.error = None;
        }
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Options for submitting a crawl.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlRequest {
    pub url: String,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_patterns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_patterns: Option<Vec<String>>,
    #[serde(default = "default_true")]
    pub generate_summaries: bool,
}

/// Page bound used when a crawl request does not set one.
pub const DEFAULT_MAX_PAGES: u32 = 100;

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES
}

fn default_true() -> bool {
    true
}

impl CrawlRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_pages: default_max_pages(),
            include_patterns: None,
            exclude_patterns: None,
            generate_summaries: true,
        }
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }
}

/// One timing sample for an instrumented request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSample {
    pub method: String,
    pub path: String,
    pub duration_ms: f64,
    pub status_code: u16,
    pub timestamp: DateTime<Utc>,
}

impl PerformanceSample {
    pub fn new(method: impl Into<String>, path: impl Into<String>, duration_ms: f64, status_code: u16) -> Self {
        Self { method: method.into(), path: path.into(), duration_ms, status_code, timestamp: Utc::now() }
    }

    /// Grouping key used by summaries, e.g. `GET /search`.
    pub fn endpoint_key(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

/// Aggregate timings for one endpoint over the retained window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSummary {
    pub count: usize,
    pub avg_duration: f64,
    pub min_duration: f64,
    pub max_duration: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(status: JobStatus) -> CrawlJob {
        CrawlJob {
            job_id: "job-1".into(),
            url: "https://docs.example.com".into(),
            status,
            page_count: None,
            embedded_count: None,
            summarized_count: None,
            error: None,
            message: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn test_regression_rules() {
        assert!(!JobStatus::Pending.regresses_to(JobStatus::Processing));
        assert!(!JobStatus::Pending.regresses_to(JobStatus::Completed));
        assert!(!JobStatus::Processing.regresses_to(JobStatus::Processing));
        assert!(JobStatus::Processing.regresses_to(JobStatus::Pending));
        assert!(JobStatus::Completed.regresses_to(JobStatus::Processing));
        assert!(JobStatus::Completed.regresses_to(JobStatus::Failed));
        assert!(!JobStatus::Failed.regresses_to(JobStatus::Failed));
    }

    #[test]
    fn test_normalized_failed_gets_error() {
        let mut failed = job(JobStatus::Failed);
        failed.message = Some("robots.txt disallowed crawl".into());
        let failed = failed.normalized();
        assert_eq!(failed.error.as_deref(), Some("robots.txt disallowed crawl"));

        let bare = job(JobStatus::Failed).normalized();
        assert_eq!(bare.error.as_deref(), Some("crawl failed"));
    }

    #[test]
    fn test_normalized_clears_error_when_not_failed() {
        let mut processing = job(JobStatus::Processing);
        processing.error = Some("stale".into());
        assert!(processing.normalized().error.is_none());
    }

    #[test]
    fn test_crawl_job_serializes_camel_case() {
        let mut completed = job(JobStatus::Completed);
        completed.page_count = Some(2);
        let value = serde_json::to_value(&completed).unwrap();
        assert_eq!(value["jobId"], "job-1");
        assert_eq!(value["status"], "completed");
        assert_eq!(value["pageCount"], 2);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_crawl_request_defaults() {
        let req: CrawlRequest = serde_json::from_str(r#"{"url":"https://docs.example.com"}"#).unwrap();
        assert_eq!(req.max_pages, 100);
        assert!(req.generate_summaries);
        assert!(req.include_patterns.is_none());
    }

    #[test]
    fn test_endpoint_key() {
        let sample = PerformanceSample::new("GET", "/search", 12.5, 200);
        assert_eq!(sample.endpoint_key(), "GET /search");
    }
}
