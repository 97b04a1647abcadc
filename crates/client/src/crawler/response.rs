//! Crawler service job payloads.
//!
//! The service has shipped both snake_case and camelCase bodies, and a few
//! status spellings; everything is folded into [`CrawlJob`] here.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use docent_core::{BackendError, CrawlJob, JobStatus};

/// A job as reported by `POST /crawl`, `GET /crawl/{id}` or `POST /crawl/crawl4ai-docs`.
#[derive(Debug, Deserialize)]
pub struct CrawlJobPayload {
    #[serde(alias = "jobId")]
    pub job_id: String,
    pub status: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, alias = "pageCount", alias = "pages")]
    pub page_count: Option<u32>,
    #[serde(default, alias = "embeddedCount")]
    pub embedded_count: Option<u32>,
    #[serde(default, alias = "summarizedCount")]
    pub summarized_count: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Map a status string onto [`JobStatus`]; unknown spellings are malformed.
pub fn parse_status(raw: &str) -> Result<JobStatus, BackendError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pending" | "started" | "queued" => Ok(JobStatus::Pending),
        "processing" | "running" | "in_progress" => Ok(JobStatus::Processing),
        "completed" | "complete" | "done" => Ok(JobStatus::Completed),
        "failed" | "error" => Ok(JobStatus::Failed),
        other => Err(BackendError::Malformed(format!("unknown crawl status '{other}'"))),
    }
}

impl CrawlJobPayload {
    /// `fallback_url` fills in the job URL when the service omits it.
    pub fn into_job(self, fallback_url: Option<&str>) -> Result<CrawlJob, BackendError> {
        let status = parse_status(&self.status)?;
        let url = self.url.or_else(|| fallback_url.map(str::to_string)).unwrap_or_default();

        let job = CrawlJob {
            job_id: self.job_id,
            url,
            status,
            page_count: self.page_count,
            embedded_count: self.embedded_count,
            summarized_count: self.summarized_count,
            error: self.error,
            message: self.message,
            created_at: self.created_at.or(self.timestamp).unwrap_or_else(Utc::now),
        };

        Ok(job.normalized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case_payload() {
        let body = r#"{
            "job_id": "8b9f",
            "status": "started",
            "url": "https://docs.example.com/",
            "page_count": null,
            "embedded_count": null,
            "summarized_count": null
        }"#;
        let payload: CrawlJobPayload = serde_json::from_str(body).unwrap();
        let job = payload.into_job(None).unwrap();

        assert_eq!(job.job_id, "8b9f");
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.url, "https://docs.example.com/");
        assert!(job.page_count.is_none());
    }

    #[test]
    fn test_camel_case_payload() {
        let body = r#"{
            "jobId": "8b9f",
            "status": "completed",
            "url": "https://docs.example.com",
            "pageCount": 2,
            "embeddedCount": 2,
            "summarizedCount": 1,
            "timestamp": "2024-03-01T12:00:00Z"
        }"#;
        let payload: CrawlJobPayload = serde_json::from_str(body).unwrap();
        let job = payload.into_job(None).unwrap();

        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.page_count, Some(2));
        assert_eq!(job.summarized_count, Some(1));
        assert_eq!(job.created_at.to_rfc3339(), "2024-03-01T12:00:00+00:00");
    }

    #[test]
    fn test_pages_alias() {
        let body = r#"{"jobId":"j","status":"running","pages":7}"#;
        let job = serde_json::from_str::<CrawlJobPayload>(body).unwrap().into_job(Some("https://a.dev")).unwrap();

        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(job.page_count, Some(7));
        assert_eq!(job.url, "https://a.dev");
    }

    #[test]
    fn test_failed_payload_gets_error() {
        let body = r#"{"job_id":"j","status":"error","message":"DNS lookup failed"}"#;
        let job = serde_json::from_str::<CrawlJobPayload>(body).unwrap().into_job(None).unwrap();

        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("DNS lookup failed"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(parse_status("Queued").unwrap(), JobStatus::Pending);
        assert_eq!(parse_status(" processing ").unwrap(), JobStatus::Processing);
        assert_eq!(parse_status("done").unwrap(), JobStatus::Completed);
        assert_eq!(parse_status("failed").unwrap(), JobStatus::Failed);
        assert!(matches!(parse_status("paused"), Err(BackendError::Malformed(_))));
    }

    #[test]
    fn test_missing_job_id_is_error() {
        assert!(serde_json::from_str::<CrawlJobPayload>(r#"{"status":"pending"}"#).is_err());
    }
}
