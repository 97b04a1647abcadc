//! Client-side polling of a crawl job until it reaches a terminal state.
//!
//! [`CrawlPoller::watch`] spawns a task that polls on a fixed interval and
//! streams [`PollEvent`]s through a [`PollHandle`]. The task stops on a
//! terminal status, on [`PollHandle::cancel`], when the handle is dropped, or
//! when the receiving side goes away.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::CrawlJobTracker;
use crate::Error;
use crate::model::CrawlJob;

/// Default delay between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

const EVENT_BUFFER: usize = 16;

/// Something observed while polling.
#[derive(Debug)]
pub enum PollEvent {
    /// Non-terminal status; polling continues.
    Status(CrawlJob),
    /// A single poll failed; polling resumes on the next tick.
    Failed(Error),
    /// Terminal status; polling has stopped.
    Finished(CrawlJob),
}

/// Spawns polling loops against a [`CrawlJobTracker`].
#[derive(Clone)]
pub struct CrawlPoller {
    tracker: CrawlJobTracker,
    interval: Duration,
}

impl CrawlPoller {
    pub fn new(tracker: CrawlJobTracker) -> Self {
        Self { tracker, interval: DEFAULT_POLL_INTERVAL }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Start polling `job_id`. The first poll happens immediately.
    ///
    /// Must be called from within a tokio runtime.
    pub fn watch(&self, job_id: impl Into<String>) -> PollHandle {
        let job_id = job_id.into();
        let token = CancellationToken::new();
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        let task = tokio::spawn(poll_loop(self.tracker.clone(), job_id, self.interval, tx, token.clone()));

        PollHandle { token, events: rx, task: Some(task) }
    }
}

/// Forgets the job's observation when the loop ends, including when the task is aborted.
struct ForgetOnExit {
    tracker: CrawlJobTracker,
    job_id: String,
}

impl Drop for ForgetOnExit {
    fn drop(&mut self) {
        self.tracker.forget(&self.job_id);
    }
}

async fn poll_loop(
    tracker: CrawlJobTracker, job_id: String, period: Duration, tx: mpsc::Sender<PollEvent>,
    token: CancellationToken,
) {
    let _forget = ForgetOnExit { tracker: tracker.clone(), job_id: job_id.clone() };
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!(job_id = %job_id, "crawl polling cancelled");
                break;
            }
            _ = ticker.tick() => {}
        }

        let event = tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!(job_id = %job_id, "crawl polling cancelled mid-request");
                break;
            }
            result = tracker.poll(&job_id) => match result {
                Ok(job) if job.is_terminal() => PollEvent::Finished(job),
                Ok(job) => PollEvent::Status(job),
                Err(e) => {
                    tracing::warn!(job_id = %job_id, error = %e, "crawl status poll failed, retrying next tick");
                    PollEvent::Failed(e)
                }
            },
        };

        let finished = matches!(event, PollEvent::Finished(_));
        if tx.send(event).await.is_err() {
            tracing::debug!(job_id = %job_id, "poll receiver dropped");
            break;
        }
        if finished {
            tracing::info!(job_id = %job_id, "crawl reached a terminal state");
            break;
        }
    }
}

/// Owner of a running polling loop.
///
/// Dropping the handle cancels the loop.
pub struct PollHandle {
    token: CancellationToken,
    events: mpsc::Receiver<PollEvent>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Next event, or `None` once the loop has stopped.
    pub async fn next(&mut self) -> Option<PollEvent> {
        self.events.recv().await
    }

    /// Stop polling. Pending events already buffered can still be drained.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Drain events until the job finishes.
    ///
    /// `on_event` sees every event, including the final one. Returns the
    /// terminal job, or `None` if polling stopped first.
    pub async fn wait_for_terminal(mut self, mut on_event: impl FnMut(&PollEvent)) -> Option<CrawlJob> {
        while let Some(event) = self.next().await {
            on_event(&event);
            if let PollEvent::Finished(job) = event {
                self.join().await;
                return Some(job);
            }
        }
        self.join().await;
        None
    }

    async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "crawl polling task ended abnormally");
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
