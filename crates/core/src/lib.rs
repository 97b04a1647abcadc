//! Core types and shared functionality for docent.
//!
//! This crate provides:
//! - Cache-aside search and document lookup over a pluggable [`CacheStore`]
//! - Crawl job submission, status tracking and client-side polling
//! - A bounded request-metrics buffer
//! - Unified error types and configuration

pub mod cache;
pub mod config;
pub mod crawl;
pub mod deadline;
pub mod error;
pub mod metrics;
pub mod model;
pub mod search;
pub mod state;

pub use cache::{CacheDb, CacheStore, MemoryStore};
pub use config::{AppConfig, CacheBackend, ConfigError};
pub use crawl::{CrawlBackend, CrawlJobTracker, CrawlPoller, PollEvent, PollHandle};
pub use error::{BackendError, Error};
pub use metrics::MetricsAggregator;
pub use model::{
    CrawlJob, CrawlRequest, Document, DocumentMetadata, EndpointSummary, JobStatus, PerformanceSample, SearchFilters,
    SearchResult,
};
pub use search::{SearchBackend, SearchCache};
pub use state::{AppState, open_store};
