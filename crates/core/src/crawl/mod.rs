//! Crawl job submission and status tracking.
//!
//! Jobs move `pending -> processing -> {completed | failed}`. The crawler
//! service owns job state; [`CrawlJobTracker`] only remembers the last status
//! it observed per job so a poll never hands back a backwards transition.

pub mod poller;

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use regex::Regex;

use crate::deadline::{DEFAULT_UPSTREAM_TIMEOUT, with_deadline};
use crate::model::{CrawlJob, CrawlRequest};
use crate::{BackendError, Error};

pub use poller::{CrawlPoller, DEFAULT_POLL_INTERVAL, PollEvent, PollHandle};

/// Upper bound on pages per crawl.
pub const MAX_CRAWL_PAGES: u32 = 1000;

/// Terminal jobs remembered for regression checks; the oldest is dropped first.
pub const DEFAULT_TERMINAL_MEMORY: usize = 256;

static CRAWL_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^https?://.+").expect("crawl url regex"));

/// The crawler-service collaborator.
#[async_trait]
pub trait CrawlBackend: Send + Sync {
    async fn submit(&self, request: &CrawlRequest) -> Result<CrawlJob, BackendError>;

    /// Current state of a job; `Ok(None)` when the service does not know the id.
    async fn status(&self, job_id: &str) -> Result<Option<CrawlJob>, BackendError>;

    /// Preset crawl of the Crawl4AI documentation site.
    async fn submit_crawl4ai_docs(&self, max_pages: u32, generate_summaries: bool) -> Result<CrawlJob, BackendError>;
}

/// Last observed state per job.
///
/// Jobs still in flight live in `active` until they turn terminal or are
/// forgotten. Terminal jobs move to a FIFO of at most `terminal_capacity`
/// entries, so a long-running process never keeps more than that many.
#[derive(Debug)]
struct Observations {
    active: HashMap<String, CrawlJob>,
    terminal: HashMap<String, CrawlJob>,
    terminal_order: VecDeque<String>,
    terminal_capacity: usize,
}

impl Observations {
    fn new(terminal_capacity: usize) -> Self {
        Self {
            active: HashMap::new(),
            terminal: HashMap::new(),
            terminal_order: VecDeque::new(),
            terminal_capacity: terminal_capacity.max(1),
        }
    }

    fn last(&self, job_id: &str) -> Option<&CrawlJob> {
        self.active.get(job_id).or_else(|| self.terminal.get(job_id))
    }

    fn record(&mut self, job: CrawlJob) {
        if !job.is_terminal() {
            self.active.insert(job.job_id.clone(), job);
            return;
        }

        self.active.remove(&job.job_id);
        let job_id = job.job_id.clone();
        if self.terminal.insert(job_id.clone(), job).is_none() {
            self.terminal_order.push_back(job_id);
        }
        while self.terminal_order.len() > self.terminal_capacity {
            if let Some(oldest) = self.terminal_order.pop_front() {
                self.terminal.remove(&oldest);
            }
        }
    }

    fn remove(&mut self, job_id: &str) {
        self.active.remove(job_id);
        if self.terminal.remove(job_id).is_some() {
            self.terminal_order.retain(|id| id != job_id);
        }
    }

    fn len(&self) -> usize {
        self.active.len() + self.terminal.len()
    }
}

/// Validates and submits crawls, and polls their status.
#[derive(Clone)]
pub struct CrawlJobTracker {
    backend: Arc<dyn CrawlBackend>,
    observed: Arc<Mutex<Observations>>,
    timeout: Duration,
}

impl CrawlJobTracker {
    pub fn new(backend: Arc<dyn CrawlBackend>) -> Self {
        Self {
            backend,
            observed: Arc::new(Mutex::new(Observations::new(DEFAULT_TERMINAL_MEMORY))),
            timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// How many terminal jobs to remember. Zero is treated as one.
    pub fn with_terminal_memory(self, capacity: usize) -> Self {
        *self.observed.lock() = Observations::new(capacity);
        self
    }

    /// Submit a crawl job.
    ///
    /// The URL and page bound are checked before the crawler is contacted.
    ///
    /// # Errors
    ///
    /// - `InvalidUrl` if `request.url` is not an http(s) URL
    /// - `InvalidInput` if `max_pages` is outside `1..=1000`
    /// - upstream errors translated from [`BackendError`]
    pub async fn submit(&self, request: &CrawlRequest) -> Result<CrawlJob, Error> {
        if !CRAWL_URL.is_match(&request.url) {
            return Err(Error::InvalidUrl(format!("'{}' is not an http(s) URL", request.url)));
        }
        validate_max_pages(request.max_pages)?;

        let job = with_deadline(self.timeout, self.backend.submit(request)).await?.normalized();
        tracing::info!(job_id = %job.job_id, url = %request.url, max_pages = request.max_pages, "crawl submitted");

        self.observe(job.clone());
        Ok(job)
    }

    /// Submit the preset Crawl4AI documentation crawl.
    pub async fn submit_crawl4ai_docs(&self, max_pages: u32, generate_summaries: bool) -> Result<CrawlJob, Error> {
        validate_max_pages(max_pages)?;

        let job = with_deadline(self.timeout, self.backend.submit_crawl4ai_docs(max_pages, generate_summaries))
            .await?
            .normalized();
        tracing::info!(job_id = %job.job_id, max_pages, "crawl4ai docs crawl submitted");

        self.observe(job.clone());
        Ok(job)
    }

    /// Read the current state of a job.
    ///
    /// # Errors
    ///
    /// - `JobNotFound` when the crawler does not know `job_id`
    /// - upstream errors translated from [`BackendError`]
    pub async fn poll(&self, job_id: &str) -> Result<CrawlJob, Error> {
        let reported = match with_deadline(self.timeout, self.backend.status(job_id)).await {
            Ok(Some(job)) => job.normalized(),
            Ok(None) | Err(BackendError::NotFound) => {
                return Err(Error::JobNotFound(format!("crawl job {job_id} not found")));
            }
            Err(e) => return Err(e.into()),
        };

        let mut observed = self.observed.lock();
        if let Some(last) = observed.last(job_id).filter(|last| last.status.regresses_to(reported.status)) {
            tracing::warn!(
                job_id,
                last = %last.status,
                reported = %reported.status,
                "crawler reported a backwards transition, keeping last observed state"
            );
            return Ok(last.clone());
        }

        observed.record(reported.clone());
        Ok(reported)
    }

    /// Drop the remembered state for a job, active or terminal.
    pub fn forget(&self, job_id: &str) {
        self.observed.lock().remove(job_id);
    }

    /// Number of jobs with a remembered state.
    pub fn tracked(&self) -> usize {
        self.observed.lock().len()
    }

    fn observe(&self, job: CrawlJob) {
        self.observed.lock().record(job);
    }
}

fn validate_max_pages(max_pages: u32) -> Result<(), Error> {
    if !(1..=MAX_CRAWL_PAGES).contains(&max_pages) {
        return Err(Error::InvalidInput(format!("maxPages must be between 1 and {MAX_CRAWL_PAGES}")));
    }
    Ok(())
}
