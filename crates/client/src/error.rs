//! Client construction errors.

use std::sync::Arc;

/// Errors raised while building an HTTP client.
///
/// Request-time failures are reported as [`docent_core::BackendError`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Base URL is not an absolute http(s) URL.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// A credential could not be encoded as a header value.
    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),

    /// reqwest refused the builder configuration.
    #[error("failed to build HTTP client: {0}")]
    Build(Arc<reqwest::Error>),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Build(Arc::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::InvalidBaseUrl { url: "ftp://x".into(), reason: "unsupported scheme".into() };
        assert!(err.to_string().contains("ftp://x"));
        assert!(err.to_string().contains("unsupported scheme"));

        assert!(ClientError::InvalidHeader("Authorization").to_string().contains("Authorization"));
    }
}
