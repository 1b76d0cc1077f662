//! Cache key scheme for wind fields.

use chrono::{DateTime, Utc};

use overlay_common::{hour_bucket, hour_key, BoundingBox};

/// Prefix shared by every wind-field key; the purge operation matches on it.
pub const WIND_KEY_PREFIX: &str = "wind:";

/// Composite key: bounding box, resolution, and hour bucket.
///
/// Two requests for the same box and resolution within one clock hour
/// produce equal keys; that collision is the freshness mechanism.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheKey {
    pub bbox: BoundingBox,
    pub nx: usize,
    pub ny: usize,
    pub hour: DateTime<Utc>,
}

impl CacheKey {
    /// Build a key for the given request at time `now` (truncated to the
    /// hour internally).
    pub fn new(bbox: BoundingBox, nx: usize, ny: usize, now: DateTime<Utc>) -> Self {
        Self {
            bbox,
            nx,
            ny,
            hour: hour_bucket(now),
        }
    }

    /// The hour fragment as it appears in the key string.
    pub fn hour_key(&self) -> String {
        hour_key(self.hour)
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}:nx{}:ny{}:t{}",
            WIND_KEY_PREFIX,
            self.bbox.cache_key(),
            self.nx,
            self.ny,
            self.hour_key()
        )
    }
}
