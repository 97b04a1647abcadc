//! Unified error types for docent.
//!
//! [`Error`] is what the core operations return to the boundary layer.
//! [`BackendError`] is what collaborator implementations (vector store,
//! crawler service) report; the core translates it per operation.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for the docent core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty query, out-of-range limit).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Crawl URL rejected before any network call.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// An upstream call exceeded its deadline.
    #[error("UPSTREAM_TIMEOUT: {0}")]
    UpstreamTimeout(String),

    /// An upstream service could not be reached or failed server-side.
    #[error("UPSTREAM_UNAVAILABLE: {0}")]
    UpstreamUnavailable(String),

    /// An upstream service refused the request (4xx other than 404).
    #[error("UPSTREAM_REJECTED: {0}")]
    UpstreamRejected(String),

    /// An upstream service answered with a payload we could not interpret.
    #[error("MALFORMED_RESPONSE: {0}")]
    MalformedResponse(String),

    /// Document not found in cache or vector store.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// Crawl job unknown to the crawler service.
    #[error("JOB_NOT_FOUND: {0}")]
    JobNotFound(String),

    /// Semantic search failed upstream.
    #[error("SEARCH_BACKEND_ERROR: {0}")]
    SearchBackendError(String),

    /// Document lookup failed upstream for a reason other than absence.
    #[error("LOOKUP_ERROR: {0}")]
    LookupError(String),

    /// Cache store failure. Never surfaced by the search path.
    #[error("CACHE_ERROR: {0}")]
    Cache(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Cache file schema could not be created or is newer than this build.
    #[error("CACHE_ERROR: schema: {0}")]
    MigrationFailed(String),
}

/// Transport-level failure reported by a collaborator implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("request timed out")]
    Timeout,

    #[error("resource not found")]
    NotFound,

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<BackendError> for Error {
    /// Generic translation used by the crawl path.
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Timeout => Error::UpstreamTimeout(err.to_string()),
            BackendError::NotFound => Error::NotFound(err.to_string()),
            BackendError::Unavailable(_) => Error::UpstreamUnavailable(err.to_string()),
            BackendError::Rejected { .. } => Error::UpstreamRejected(err.to_string()),
            BackendError::Malformed(msg) => Error::MalformedResponse(msg),
        }
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::NotFound(msg) => (-32001, msg.clone()),
            Error::JobNotFound(msg) => (-32004, msg.clone()),
            Error::UpstreamTimeout(msg) => (-32006, msg.clone()),
            Error::UpstreamUnavailable(msg) => (-32008, msg.clone()),
            Error::UpstreamRejected(msg) => (-32009, msg.clone()),
            Error::MalformedResponse(msg) => (-32010, msg.clone()),
            Error::SearchBackendError(msg) => (-32011, msg.clone()),
            Error::LookupError(msg) => (-32012, msg.clone()),
            Error::Cache(msg) => (-32002, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::JobNotFound("job-42".to_string());
        assert!(err.to_string().contains("JOB_NOT_FOUND"));
        assert!(err.to_string().contains("job-42"));
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::NotFound("doc-1".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32001);

        let mcp_err: McpError = Error::InvalidUrl("ftp://x".into()).into();
        assert_eq!(mcp_err.code.0, -32003);
    }

    #[test]
    fn test_backend_error_translation() {
        assert!(matches!(Error::from(BackendError::Timeout), Error::UpstreamTimeout(_)));
        assert!(matches!(Error::from(BackendError::Unavailable("refused".into())), Error::UpstreamUnavailable(_)));
        assert!(matches!(
            Error::from(BackendError::Rejected { status: 422, message: "bad".into() }),
            Error::UpstreamRejected(_)
        ));
        assert!(matches!(Error::from(BackendError::Malformed("eof".into())), Error::MalformedResponse(_)));
    }
}
