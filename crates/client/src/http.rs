//! Shared HTTP plumbing for the collaborator clients.
//!
//! ### Status classification
//!
//! | Response | [`BackendError`] |
//! |----------|------------------|
//! | timeout | `Timeout` |
//! | connect / transport failure | `Unavailable` |
//! | 404 | `NotFound` |
//! | other 4xx | `Rejected { status }` |
//! | 5xx | `Unavailable` |
//! | undecodable body | `Malformed` |

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::ClientError;
use docent_core::BackendError;

/// Longest error body excerpt carried into a [`BackendError`].
const MAX_ERROR_BODY: usize = 512;

/// Parse and check a collaborator base URL.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ClientError::InvalidBaseUrl { url: raw.to_string(), reason: e.to_string() })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ClientError::InvalidBaseUrl { url: raw.to_string(), reason: format!("unsupported scheme '{other}'") }),
    }
}

/// Append path segments to a base URL, percent-encoding each one.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

pub(crate) fn build_http(user_agent: &str, timeout: Duration, headers: HeaderMap) -> Result<Client, ClientError> {
    let http = Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .default_headers(headers)
        .use_rustls_tls()
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()?;
    Ok(http)
}

pub(crate) fn transport_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout
    } else if err.is_decode() {
        BackendError::Malformed(err.to_string())
    } else {
        BackendError::Unavailable(err.to_string())
    }
}

pub(crate) fn status_error(status: StatusCode, body: &str) -> BackendError {
    let mut message: String = body.trim().chars().take(MAX_ERROR_BODY).collect();
    if message.is_empty() {
        message = status.canonical_reason().unwrap_or("no reason").to_string();
    }

    if status == StatusCode::NOT_FOUND {
        BackendError::NotFound
    } else if status.is_client_error() {
        BackendError::Rejected { status: status.as_u16(), message }
    } else {
        BackendError::Unavailable(format!("HTTP {}: {message}", status.as_u16()))
    }
}

/// Check the status, then decode the body as JSON.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(transport_error)?;

    if !status.is_success() {
        return Err(status_error(status, &String::from_utf8_lossy(&bytes)));
    }

    serde_json::from_slice(&bytes).map_err(|e| BackendError::Malformed(e.to_string()))
}
