//! The cache port consumed by the fetch orchestrator.

use async_trait::async_trait;
use thiserror::Error;

use crate::entry::CacheEntry;
use crate::key::CacheKey;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache read failed: {0}")]
    ReadFailed(String),

    #[error("Cache write failed: {0}")]
    WriteFailed(String),

    #[error("Cache purge failed: {0}")]
    PurgeFailed(String),
}

/// Key/value port for wind-field entries.
///
/// Implementations are constructed once at startup and injected into the
/// orchestrator; nothing else touches the backing store directly. A `get`
/// that hits a corrupt entry reports a miss, not an error.
#[async_trait]
pub trait FieldCache: Send + Sync {
    /// Look up an entry. `None` covers both absence and unreadable entries.
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError>;

    /// Store an entry. Writing the same key twice is harmless.
    async fn put(&self, key: &CacheKey, entry: CacheEntry) -> Result<(), CacheError>;

    /// Remove every entry whose key starts with `prefix`; returns the
    /// number removed.
    async fn purge_by_prefix(&self, prefix: &str) -> Result<usize, CacheError>;
}
