//! Background removal of expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::CacheStore;

/// Spawn a task that calls [`CacheStore::purge_expired`] every `every` until `token` is cancelled.
///
/// The first sweep runs one full interval after spawning.
pub fn spawn_sweeper(store: Arc<dyn CacheStore>, every: Duration, token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            match store.purge_expired().await {
                Ok(0) => {}
                Ok(removed) => tracing::debug!(removed, "swept expired cache entries"),
                Err(e) => tracing::warn!(error = %e, "cache sweep failed"),
            }
        }

        tracing::debug!("cache sweeper stopped");
    })
}
