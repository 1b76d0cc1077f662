//! File-backed cache surviving process restarts.
//!
//! One JSON file per key under a root directory. The stored envelope keeps
//! the original key string; a file whose contents fail to parse or whose
//! recorded key does not match the lookup is treated as a miss.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use crate::entry::CacheEntry;
use crate::key::CacheKey;
use crate::store::{CacheError, FieldCache};

#[derive(Debug, Serialize, Deserialize)]
struct StoredEnvelope {
    key: String,
    entry: CacheEntry,
}

/// Persistent key/value store scoped to a directory.
pub struct FileFieldCache {
    root: PathBuf,
}

impl FileFieldCache {
    /// Open (creating if needed) a cache rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| CacheError::WriteFailed(format!("create {}: {}", root.display(), e)))?;
        Ok(Self { root })
    }

    /// Map a key string to a filename. Character-wise, so string prefixes
    /// stay filename prefixes and purge-by-prefix can match on disk.
    fn filename(key: &str) -> String {
        let sanitized: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        format!("{}.json", sanitized)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(Self::filename(key))
    }

    async fn read_envelope(path: &Path) -> Option<StoredEnvelope> {
        let bytes = fs::read(path).await.ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(envelope) => Some(envelope),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Corrupt cache entry, treating as miss");
                None
            }
        }
    }

    /// Remove entries older than `max_age`; returns the number removed.
    ///
    /// The hour-bucketed key scheme never expires entries on its own, so
    /// long-running deployments run this sweep periodically.
    pub async fn sweep_older_than(&self, max_age: Duration) -> Result<usize, CacheError> {
        let now = Utc::now();
        let mut removed = 0usize;

        let mut dir = fs::read_dir(&self.root)
            .await
            .map_err(|e| CacheError::PurgeFailed(e.to_string()))?;

        while let Some(item) = dir
            .next_entry()
            .await
            .map_err(|e| CacheError::PurgeFailed(e.to_string()))?
        {
            let path = item.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let stale = match Self::read_envelope(&path).await {
                Some(envelope) => envelope.entry.age(now) > max_age,
                // Unreadable entries get swept too.
                None => true,
            };
            if stale && fs::remove_file(&path).await.is_ok() {
                removed += 1;
            }
        }

        debug!(removed = removed, "Cache sweep finished");
        Ok(removed)
    }
}

#[async_trait]
impl FieldCache for FileFieldCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        let key_str = key.to_string();
        let path = self.path_for(&key_str);
        if !path.exists() {
            return Ok(None);
        }

        match Self::read_envelope(&path).await {
            Some(envelope) if envelope.key == key_str => {
                debug!(key = %key_str, "Cache hit");
                Ok(Some(envelope.entry))
            }
            Some(envelope) => {
                warn!(
                    expected = %key_str,
                    found = %envelope.key,
                    "Cache filename collision, treating as miss"
                );
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &CacheKey, entry: CacheEntry) -> Result<(), CacheError> {
        let key_str = key.to_string();
        let envelope = StoredEnvelope {
            key: key_str.clone(),
            entry,
        };
        let bytes = serde_json::to_vec(&envelope)
            .map_err(|e| CacheError::WriteFailed(e.to_string()))?;

        let path = self.path_for(&key_str);
        fs::write(&path, bytes)
            .await
            .map_err(|e| CacheError::WriteFailed(format!("write {}: {}", path.display(), e)))?;

        debug!(key = %key_str, "Cache entry written");
        Ok(())
    }

    async fn purge_by_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
        let filename_prefix: String = Self::filename(prefix)
            .trim_end_matches(".json")
            .to_string();
        let mut removed = 0usize;

        let mut dir = fs::read_dir(&self.root)
            .await
            .map_err(|e| CacheError::PurgeFailed(e.to_string()))?;

        while let Some(item) = dir
            .next_entry()
            .await
            .map_err(|e| CacheError::PurgeFailed(e.to_string()))?
        {
            let name = item.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with(&filename_prefix) && fs::remove_file(item.path()).await.is_ok() {
                removed += 1;
            }
        }

        debug!(prefix = prefix, removed = removed, "Purged cache files");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use overlay_common::bbox::FRANCE;
    use overlay_common::{BandHeader, FieldBand, WindField, WindQuantity};

    fn test_field(nx: usize, ny: usize) -> WindField {
        let now = Utc::now();
        let u_header = BandHeader::new(WindQuantity::U, &FRANCE, nx, ny, 1.0, 1.0, now);
        let v_header = BandHeader::new(WindQuantity::V, &FRANCE, nx, ny, 1.0, 1.0, now);
        WindField::new(
            FieldBand {
                header: u_header,
                data: vec![2.5; nx * ny],
            },
            FieldBand {
                header: v_header,
                data: vec![-2.5; nx * ny],
            },
        )
        .unwrap()
    }

    fn test_key(nx: usize) -> CacheKey {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 14, 0, 0).unwrap();
        CacheKey::new(FRANCE, nx, nx, now)
    }

    #[tokio::test]
    async fn test_round_trip_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let key = test_key(4);
        let entry = CacheEntry::new(&key, test_field(4, 4), Utc::now());

        {
            let cache = FileFieldCache::open(dir.path()).await.unwrap();
            cache.put(&key, entry.clone()).await.unwrap();
        }

        // A second instance over the same directory sees the entry.
        let cache = FileFieldCache::open(dir.path()).await.unwrap();
        let fetched = cache.get(&key).await.unwrap().unwrap();
        assert_eq!(fetched.wind_data, entry.wind_data);
        assert_eq!(fetched.hour_key, "2024-03-07T14:00");
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileFieldCache::open(dir.path()).await.unwrap();
        let key = test_key(4);

        let path = cache.path_for(&key.to_string());
        fs::write(&path, b"{ not json").await.unwrap();

        assert!(cache.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_by_prefix_only_matches_wind_keys() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileFieldCache::open(dir.path()).await.unwrap();

        let key = test_key(4);
        let entry = CacheEntry::new(&key, test_field(4, 4), Utc::now());
        cache.put(&key, entry).await.unwrap();

        // An unrelated file in the cache directory stays put.
        let other = dir.path().join("theme.json");
        fs::write(&other, b"{}").await.unwrap();

        let removed = cache.purge_by_prefix("wind:").await.unwrap();
        assert_eq!(removed, 1);
        assert!(cache.get(&key).await.unwrap().is_none());
        assert!(other.exists());
    }

    #[tokio::test]
    async fn test_sweep_removes_old_entries() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileFieldCache::open(dir.path()).await.unwrap();

        let old_key = test_key(4);
        let old_entry = CacheEntry::new(
            &old_key,
            test_field(4, 4),
            Utc::now() - Duration::hours(30),
        );
        cache.put(&old_key, old_entry).await.unwrap();

        let fresh_key = test_key(5);
        let fresh_entry = CacheEntry::new(&fresh_key, test_field(5, 5), Utc::now());
        cache.put(&fresh_key, fresh_entry).await.unwrap();

        let removed = cache.sweep_older_than(Duration::hours(24)).await.unwrap();
        assert_eq!(removed, 1);
        assert!(cache.get(&old_key).await.unwrap().is_none());
        assert!(cache.get(&fresh_key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_idempotent_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileFieldCache::open(dir.path()).await.unwrap();
        let key = test_key(4);
        let entry = CacheEntry::new(&key, test_field(4, 4), Utc::now());

        cache.put(&key, entry.clone()).await.unwrap();
        cache.put(&key, entry.clone()).await.unwrap();

        let fetched = cache.get(&key).await.unwrap().unwrap();
        assert_eq!(fetched.wind_data, entry.wind_data);
    }
}
