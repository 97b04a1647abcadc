//! Key/value caching with per-entry time-to-live.
//!
//! [`CacheStore`] is the seam the search cache talks to. Two implementations
//! are provided:
//!
//! - [`MemoryStore`]: in-process map guarded by a tokio `RwLock`
//! - [`CacheDb`]: SQLite file via tokio-rusqlite, WAL mode, schema version in `user_version`
//!
//! Values are serialized JSON. Expired entries read as misses; both stores
//! also support an active sweep through [`CacheStore::purge_expired`].

pub mod connection;
pub mod hash;
pub mod memory;
pub mod schema;
pub mod store;
pub mod sweep;

use std::time::Duration;

use async_trait::async_trait;

pub use crate::Error;

pub use connection::CacheDb;
pub use hash::{document_key, normalize_query, search_key};
pub use memory::MemoryStore;
pub use sweep::spawn_sweeper;

/// A cached value and the instant it stops being readable.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub expires_at: tokio::time::Instant,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V, ttl: Duration) -> Self {
        Self { value, expires_at: tokio::time::Instant::now() + ttl }
    }

    /// An entry is dead once `now >= expires_at`.
    pub fn is_expired(&self) -> bool {
        tokio::time::Instant::now() >= self.expires_at
    }
}

/// Generic key/value store with per-entry TTL.
///
/// Errors are returned so stores can report them, but callers on the read
/// path treat any error as a miss.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch a live value. Expired entries return `None`.
    async fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Insert or overwrite a value that expires after `ttl`.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), Error>;

    /// Remove every expired entry, returning how many were dropped.
    async fn purge_expired(&self) -> Result<u64, Error>;
}
