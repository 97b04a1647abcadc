//! Deadlines for outbound collaborator calls.

use std::future::Future;
use std::time::Duration;

use crate::BackendError;

/// Default upstream deadline.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(60);

/// Run a collaborator call, turning an elapsed deadline into [`BackendError::Timeout`].
pub async fn with_deadline<T, F>(timeout: Duration, call: F) -> Result<T, BackendError>
where
    F: Future<Output = Result<T, BackendError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(BackendError::Timeout),
    }
}
