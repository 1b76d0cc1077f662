//! Cache entry envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use overlay_common::{BoundingBox, WindField};

use crate::key::CacheKey;

/// The JSON envelope persisted per key.
///
/// Written once, read many times, never mutated; a new hour bucket
/// supersedes it under a different key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Write timestamp in epoch milliseconds.
    pub ts: i64,
    pub wind_data: WindField,
    pub bbox: BoundingBox,
    pub nx: usize,
    pub ny: usize,
    pub hour_key: String,
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Wrap a freshly built field under its key.
    pub fn new(key: &CacheKey, wind_data: WindField, now: DateTime<Utc>) -> Self {
        Self {
            ts: now.timestamp_millis(),
            wind_data,
            bbox: key.bbox,
            nx: key.nx,
            ny: key.ny,
            hour_key: key.hour_key(),
            created_at: now,
        }
    }

    /// Age of this entry relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.created_at
    }
}
