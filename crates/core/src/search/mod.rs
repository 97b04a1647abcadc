//! Cache-aside layer over semantic search and document lookup.
//!
//! ### Read path
//!
//! - Unfiltered searches are keyed by [`search_key`] (normalized query + limit).
//! - Filtered searches never touch the store, in either direction.
//! - Documents are keyed by [`document_key`].
//! - A hit is returned as stored: no re-ranking, no TTL refresh.
//! - Store failures (read, write, or undecodable payload) degrade to a miss.
//!
//! Concurrent misses for the same key may each reach the backend and each
//! write the store; the last writer wins.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::{CacheStore, document_key, search_key};
use crate::deadline::{DEFAULT_UPSTREAM_TIMEOUT, with_deadline};
use crate::model::{Document, SearchFilters, SearchResult};
use crate::{BackendError, Error};

/// Default time-to-live for cached results.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Largest result limit accepted for a search.
pub const MAX_SEARCH_LIMIT: usize = 100;

/// Default result limit when the caller does not pick one.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// The vector-search collaborator.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Semantic search over `concepts`, optionally restricted by field filters.
    async fn search(
        &self, concepts: &[String], limit: usize, filters: Option<&SearchFilters>,
    ) -> Result<SearchResult, BackendError>;

    /// Fetch one document by id; `Ok(None)` when the id is unknown.
    async fn get_by_id(&self, id: &str) -> Result<Option<Document>, BackendError>;
}

/// Cache-aside front for a [`SearchBackend`].
#[derive(Clone)]
pub struct SearchCache {
    backend: Arc<dyn SearchBackend>,
    store: Arc<dyn CacheStore>,
    ttl: Duration,
    timeout: Duration,
}

impl SearchCache {
    pub fn new(backend: Arc<dyn SearchBackend>, store: Arc<dyn CacheStore>) -> Self {
        Self { backend, store, ttl: DEFAULT_CACHE_TTL, timeout: DEFAULT_UPSTREAM_TIMEOUT }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The underlying store, for maintenance such as sweeping expired entries.
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Semantic search with cache-aside semantics.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty query or a limit outside `1..=100`
    /// - `UpstreamTimeout` when the backend misses its deadline
    /// - `SearchBackendError` for any other backend failure
    pub async fn search(
        &self, query: &str, limit: usize, filters: Option<&SearchFilters>,
    ) -> Result<SearchResult, Error> {
        if query.trim().is_empty() {
            return Err(Error::InvalidInput("query cannot be empty".into()));
        }
        if !(1..=MAX_SEARCH_LIMIT).contains(&limit) {
            return Err(Error::InvalidInput(format!("limit must be between 1 and {MAX_SEARCH_LIMIT}")));
        }

        let concepts = vec![query.to_string()];

        if let Some(filters) = filters.filter(|f| !f.is_empty()) {
            tracing::debug!(?filters, "skipping cache for filtered search");
            return self.fetch_search(&concepts, limit, Some(filters)).await;
        }

        let key = search_key(query, limit);
        if let Some(cached) = self.read::<SearchResult>(&key).await {
            tracing::debug!(query, limit, "cache hit for search");
            return Ok(cached);
        }

        tracing::debug!(query, limit, "cache miss for search");
        let result = self.fetch_search(&concepts, limit, None).await?;
        self.write(&key, &result).await;

        Ok(result)
    }

    /// Document lookup with cache-aside semantics.
    ///
    /// # Errors
    ///
    /// - `NotFound` when neither the cache nor the backend knows the id
    /// - `UpstreamTimeout` when the backend misses its deadline
    /// - `LookupError` for any other backend failure
    pub async fn get_document_by_id(&self, id: &str) -> Result<Document, Error> {
        if id.trim().is_empty() {
            return Err(Error::InvalidInput("document id cannot be empty".into()));
        }

        let key = document_key(id);
        if let Some(cached) = self.read::<Document>(&key).await {
            tracing::debug!(id, "cache hit for document");
            return Ok(cached);
        }

        tracing::debug!(id, "cache miss for document");
        let mut document = match with_deadline(self.timeout, self.backend.get_by_id(id)).await {
            Ok(Some(document)) => document,
            Ok(None) | Err(BackendError::NotFound) => {
                return Err(Error::NotFound(format!("document with ID {id} not found")));
            }
            Err(BackendError::Timeout) => {
                return Err(Error::UpstreamTimeout(format!("document lookup for {id} exceeded {:?}", self.timeout)));
            }
            Err(e) => return Err(Error::LookupError(format!("failed to fetch document {id}: {e}"))),
        };

        // Lookups never carry a relevance score.
        document.score = None;
        self.write(&key, &document).await;

        Ok(document)
    }

    async fn fetch_search(
        &self, concepts: &[String], limit: usize, filters: Option<&SearchFilters>,
    ) -> Result<SearchResult, Error> {
        with_deadline(self.timeout, self.backend.search(concepts, limit, filters))
            .await
            .map_err(|e| match e {
                BackendError::Timeout => Error::UpstreamTimeout(format!("search exceeded {:?}", self.timeout)),
                other => Error::SearchBackendError(other.to_string()),
            })
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let json = match self.store.get(key).await {
            Ok(json) => json?,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "cached value could not be decoded, treating as miss");
                None
            }
        }
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to encode value for cache");
                return;
            }
        };

        if let Err(e) = self.store.set(key, json, self.ttl).await {
            tracing::warn!(key, error = %e, "failed to write cache entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;
    use crate::model::DocumentMetadata;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn doc(id: &str, score: Option<f64>) -> Document {
        Document {
            id: id.to_string(),
            content: format!("content of {id}"),
            metadata: DocumentMetadata {
                title: format!("Title {id}"),
                url: format!("https://docs.example.com/{id}"),
                source: "docs.example.com".into(),
                version: Some("latest".into()),
                last_updated: None,
            },
            score,
        }
    }

    #[derive(Default)]
    struct FakeBackend {
        search_calls: AtomicUsize,
        lookup_calls: AtomicUsize,
        search_error: Option<BackendError>,
        lookup_error: Option<BackendError>,
        documents: Vec<Document>,
        delay: Option<Duration>,
    }

    impl FakeBackend {
        fn with_documents(documents: Vec<Document>) -> Self {
            Self { documents, ..Default::default() }
        }
    }

    #[async_trait]
    impl SearchBackend for FakeBackend {
        async fn search(
            &self, _concepts: &[String], limit: usize, _filters: Option<&SearchFilters>,
        ) -> Result<SearchResult, BackendError> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(err) = &self.search_error {
                return Err(err.clone());
            }
            Ok(SearchResult::new(self.documents.iter().take(limit).cloned().collect()))
        }

        async fn get_by_id(&self, id: &str) -> Result<Option<Document>, BackendError> {
            self.lookup_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = &self.lookup_error {
                return Err(err.clone());
            }
            Ok(self.documents.iter().find(|d| d.id == id).cloned())
        }
    }

    /// A store whose every operation fails.
    struct BrokenStore {
        writes: AtomicUsize,
    }

    #[async_trait]
    impl CacheStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, Error> {
            Err(Error::Cache("connection reset".into()))
        }

        async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), Error> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Err(Error::Cache("connection reset".into()))
        }

        async fn purge_expired(&self) -> Result<u64, Error> {
            Err(Error::Cache("connection reset".into()))
        }
    }

    fn setup(backend: FakeBackend) -> (Arc<FakeBackend>, Arc<MemoryStore>, SearchCache) {
        let backend = Arc::new(backend);
        let store = Arc::new(MemoryStore::new());
        let cache = SearchCache::new(backend.clone(), store.clone());
        (backend, store, cache)
    }

    #[tokio::test]
    async fn test_repeat_search_hits_cache() {
        let (backend, _store, cache) = setup(FakeBackend::with_documents(vec![doc("a", Some(0.9)), doc("b", Some(0.8))]));

        let first = cache.search("weaviate", 10, None).await.unwrap();
        let second = cache.search("weaviate", 10, None).await.unwrap();

        assert_eq!(first.documents.len(), 2);
        assert_eq!(first, second);
        assert_eq!(backend.search_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_equivalent_queries_share_entry() {
        let (backend, _store, cache) = setup(FakeBackend::with_documents(vec![doc("a", Some(0.9))]));

        cache.search("How to use Weaviate", 10, None).await.unwrap();
        cache.search("  how to  use weaviate ", 10, None).await.unwrap();

        assert_eq!(backend.search_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_different_limit_is_separate_entry() {
        let (backend, _store, cache) = setup(FakeBackend::with_documents(vec![doc("a", Some(0.9))]));

        cache.search("weaviate", 10, None).await.unwrap();
        cache.search("weaviate", 20, None).await.unwrap();

        assert_eq!(backend.search_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_filtered_search_bypasses_cache() {
        let (backend, store, cache) = setup(FakeBackend::with_documents(vec![doc("a", Some(0.9))]));
        let filters = SearchFilters::from([("source".to_string(), "docs.example.com".to_string())]);

        cache.search("weaviate", 10, Some(&filters)).await.unwrap();
        cache.search("weaviate", 10, Some(&filters)).await.unwrap();

        assert_eq!(backend.search_calls.load(Ordering::SeqCst), 2);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_empty_filters_use_cache() {
        let (backend, _store, cache) = setup(FakeBackend::with_documents(vec![doc("a", Some(0.9))]));
        let filters = SearchFilters::new();

        cache.search("weaviate", 10, Some(&filters)).await.unwrap();
        cache.search("weaviate", 10, None).await.unwrap();

        assert_eq!(backend.search_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let (backend, _store, cache) = setup(FakeBackend::with_documents(vec![doc("a", Some(0.9))]));
        let cache = cache.with_ttl(Duration::from_secs(300));

        cache.search("weaviate", 10, None).await.unwrap();
        tokio::time::advance(Duration::from_secs(299)).await;
        cache.search("weaviate", 10, None).await.unwrap();
        assert_eq!(backend.search_calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(1)).await;
        cache.search("weaviate", 10, None).await.unwrap();
        assert_eq!(backend.search_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_backend_failure_is_not_cached() {
        let backend = FakeBackend {
            search_error: Some(BackendError::Unavailable("connection refused".into())),
            ..Default::default()
        };
        let (backend, store, cache) = setup(backend);

        let result = cache.search("weaviate", 10, None).await;
        assert!(matches!(result, Err(Error::SearchBackendError(_))));
        assert!(store.is_empty().await);

        let _ = cache.search("weaviate", 10, None).await;
        assert_eq!(backend.search_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_backend_times_out() {
        let backend = FakeBackend { delay: Some(Duration::from_secs(120)), ..Default::default() };
        let (_backend, store, cache) = setup(backend);
        let cache = cache.with_timeout(Duration::from_secs(60));

        let result = cache.search("weaviate", 10, None).await;
        assert!(matches!(result, Err(Error::UpstreamTimeout(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_broken_store_degrades_to_backend() {
        let backend = Arc::new(FakeBackend::with_documents(vec![doc("a", Some(0.9))]));
        let store = Arc::new(BrokenStore { writes: AtomicUsize::new(0) });
        let cache = SearchCache::new(backend.clone(), store.clone());

        let result = cache.search("weaviate", 10, None).await.unwrap();
        assert_eq!(result.total, 1);

        let doc = cache.get_document_by_id("a").await.unwrap();
        assert_eq!(doc.id, "a");

        assert_eq!(backend.search_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.writes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_miss() {
        let (backend, store, cache) = setup(FakeBackend::with_documents(vec![doc("a", Some(0.9))]));
        store.set(&search_key("weaviate", 10), "not json".into(), Duration::from_secs(60)).await.unwrap();

        let result = cache.search("weaviate", 10, None).await.unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(backend.search_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_search_input() {
        let (backend, _store, cache) = setup(FakeBackend::default());

        assert!(matches!(cache.search("   ", 10, None).await, Err(Error::InvalidInput(_))));
        assert!(matches!(cache.search("weaviate", 0, None).await, Err(Error::InvalidInput(_))));
        assert!(matches!(cache.search("weaviate", 101, None).await, Err(Error::InvalidInput(_))));
        assert_eq!(backend.search_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_document_lookup_is_cached() {
        let (backend, store, cache) = setup(FakeBackend::with_documents(vec![doc("doc-1", Some(0.5))]));

        let first = cache.get_document_by_id("doc-1").await.unwrap();
        let second = cache.get_document_by_id("doc-1").await.unwrap();

        assert_eq!(first, second);
        assert!(first.score.is_none());
        assert_eq!(backend.lookup_calls.load(Ordering::SeqCst), 1);
        assert!(store.get("document:doc-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_missing_document_is_not_found() {
        let (_backend, store, cache) = setup(FakeBackend::default());

        let result = cache.get_document_by_id("missing-id").await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_cached_document_survives_backend_absence() {
        let (backend, store, cache) = setup(FakeBackend::default());
        let cached = doc("doc-9", None);
        store
            .set(&document_key("doc-9"), serde_json::to_string(&cached).unwrap(), Duration::from_secs(60))
            .await
            .unwrap();

        let found = cache.get_document_by_id("doc-9").await.unwrap();
        assert_eq!(found, cached);
        assert_eq!(backend.lookup_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lookup_failure_maps_to_lookup_error() {
        let backend = FakeBackend {
            lookup_error: Some(BackendError::Rejected { status: 500, message: "boom".into() }),
            ..Default::default()
        };
        let (_backend, _store, cache) = setup(backend);

        let result = cache.get_document_by_id("doc-1").await;
        assert!(matches!(result, Err(Error::LookupError(_))));
    }

    #[tokio::test]
    async fn test_lookup_not_found_error_maps_to_not_found() {
        let backend = FakeBackend { lookup_error: Some(BackendError::NotFound), ..Default::default() };
        let (_backend, _store, cache) = setup(backend);

        let result = cache.get_document_by_id("doc-1").await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
