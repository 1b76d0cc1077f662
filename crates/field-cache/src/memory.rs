//! Bounded in-memory cache.
//!
//! LRU-bounded so hour-bucketed keys cannot accumulate without limit.

use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;
use tracing::debug;

use crate::entry::CacheEntry;
use crate::key::CacheKey;
use crate::store::{CacheError, FieldCache};

/// Hit/miss counters for the memory store.
#[derive(Debug, Default, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// In-memory LRU store, suitable for a single long-running process and for
/// tests. Entries evicted by capacity pressure count as misses on re-read.
pub struct MemoryFieldCache {
    cache: Arc<RwLock<LruCache<String, CacheEntry>>>,
    stats: Arc<RwLock<CacheStats>>,
}

impl MemoryFieldCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity floor is 1");
        Self {
            cache: Arc::new(RwLock::new(LruCache::new(capacity))),
            stats: Arc::new(RwLock::new(CacheStats::default())),
        }
    }

    pub async fn stats(&self) -> CacheStats {
        let mut stats = self.stats.read().await.clone();
        stats.entries = self.cache.read().await.len();
        stats
    }
}

#[async_trait]
impl FieldCache for MemoryFieldCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        let key_str = key.to_string();
        let entry = self.cache.write().await.get(&key_str).cloned();

        let mut stats = self.stats.write().await;
        if entry.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }

        Ok(entry)
    }

    async fn put(&self, key: &CacheKey, entry: CacheEntry) -> Result<(), CacheError> {
        self.cache.write().await.put(key.to_string(), entry);
        Ok(())
    }

    async fn purge_by_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
        let mut cache = self.cache.write().await;
        let doomed: Vec<String> = cache
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect();

        for key in &doomed {
            cache.pop(key);
        }

        debug!(prefix = prefix, removed = doomed.len(), "Purged cache keys");
        Ok(doomed.len())
    }
}
