//! Shared application state handed to the server handler and the CLI.

use std::sync::Arc;

use crate::cache::{CacheDb, CacheStore, MemoryStore};
use crate::config::{AppConfig, CacheBackend};
use crate::crawl::{CrawlBackend, CrawlJobTracker, CrawlPoller};
use crate::metrics::MetricsAggregator;
use crate::search::{SearchBackend, SearchCache};
use crate::Error;

/// Everything an inbound request needs, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub search: SearchCache,
    pub crawl: CrawlJobTracker,
    pub metrics: Arc<MetricsAggregator>,
}

impl AppState {
    pub fn new(
        config: AppConfig, search_backend: Arc<dyn SearchBackend>, crawl_backend: Arc<dyn CrawlBackend>,
        store: Arc<dyn CacheStore>,
    ) -> Self {
        let search =
            SearchCache::new(search_backend, store).with_ttl(config.cache_ttl()).with_timeout(config.timeout());
        let crawl = CrawlJobTracker::new(crawl_backend).with_timeout(config.timeout());
        let metrics = Arc::new(MetricsAggregator::new(config.metrics_capacity));

        Self { config: Arc::new(config), search, crawl, metrics }
    }

    /// A poller over this state's tracker, ticking at the configured interval.
    pub fn poller(&self) -> CrawlPoller {
        CrawlPoller::new(self.crawl.clone()).with_interval(self.config.poll_interval())
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        self.search.store()
    }
}

/// Open the cache store selected by `config.cache_backend`.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn CacheStore>, Error> {
    match config.cache_backend {
        CacheBackend::Memory => {
            tracing::debug!("using in-memory cache");
            Ok(Arc::new(MemoryStore::new()))
        }
        CacheBackend::Sqlite => {
            tracing::debug!(path = %config.db_path.display(), "using sqlite cache");
            Ok(Arc::new(CacheDb::open(&config.db_path).await?))
        }
    }
}
