//! Cache-first acquisition with adaptive degradation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

use field_cache::{CacheEntry, CacheKey, FieldCache, WIND_KEY_PREFIX};
use overlay_common::{hour_bucket, hour_key, time::parse_time_label, BoundingBox, SamplingGrid, WindField};

use crate::builder::build_wind_field;
use crate::provider::{PointSeries, WindProvider};
use crate::state::{Degradation, FetchEvent, FetchState, ResponseClass};

/// Where an acquired field came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOrigin {
    Cache,
    Network,
}

/// A successful acquisition at the resolution actually achieved (which may
/// be smaller than requested after degradation).
#[derive(Debug, Clone)]
pub struct Acquired {
    pub field: WindField,
    pub origin: FieldOrigin,
    pub nx: usize,
    pub ny: usize,
}

/// Tuning for the retry ladder.
#[derive(Debug, Clone)]
pub struct AcquireConfig {
    pub max_attempts: u32,
    pub backoff: Duration,
    pub degradation: Degradation,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            backoff: Duration::from_millis(700),
            degradation: Degradation::default(),
        }
    }
}

/// Produces wind fields for a requested extent and resolution: cache first,
/// network with degrade-and-retry on miss. No error escapes `acquire`; every
/// failure path resolves to `None` and is logged here.
pub struct Orchestrator {
    provider: Arc<dyn WindProvider>,
    cache: Arc<dyn FieldCache>,
    config: AcquireConfig,
    // Concurrent acquires for one key share a single outstanding request.
    inflight: Mutex<HashMap<String, Arc<OnceCell<Option<Acquired>>>>>,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn WindProvider>,
        cache: Arc<dyn FieldCache>,
        config: AcquireConfig,
    ) -> Self {
        Self {
            provider,
            cache,
            config,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire a field for the current hour bucket.
    pub async fn acquire(&self, bbox: BoundingBox, nx: usize, ny: usize) -> Option<Acquired> {
        self.acquire_at(bbox, nx, ny, Utc::now()).await
    }

    /// Acquire relative to an explicit `now`; the entry point for tests and
    /// for replays.
    #[instrument(skip(self), fields(nx = nx, ny = ny))]
    pub async fn acquire_at(
        &self,
        bbox: BoundingBox,
        nx: usize,
        ny: usize,
        now: DateTime<Utc>,
    ) -> Option<Acquired> {
        let key_str = CacheKey::new(bbox, nx, ny, now).to_string();

        let cell = {
            let mut inflight = self.inflight.lock().expect("inflight map poisoned");
            inflight
                .entry(key_str.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let result = cell
            .get_or_init(|| self.acquire_uncached(bbox, nx, ny, now))
            .await
            .clone();

        self.inflight
            .lock()
            .expect("inflight map poisoned")
            .remove(&key_str);

        result
    }

    /// Drop every cached wind entry; returns the number removed.
    pub async fn purge(&self) -> usize {
        match self.cache.purge_by_prefix(WIND_KEY_PREFIX).await {
            Ok(count) => {
                info!(removed = count, "Purged wind cache");
                count
            }
            Err(e) => {
                warn!(error = %e, "Cache purge failed");
                0
            }
        }
    }

    async fn acquire_uncached(
        &self,
        bbox: BoundingBox,
        nx: usize,
        ny: usize,
        now: DateTime<Utc>,
    ) -> Option<Acquired> {
        let key = CacheKey::new(bbox, nx, ny, now);
        match self.cache.get(&key).await {
            Ok(Some(entry)) => {
                debug!(key = %key, "Serving wind field from cache");
                return Some(Acquired {
                    field: entry.wind_data,
                    origin: FieldOrigin::Cache,
                    nx: entry.nx,
                    ny: entry.ny,
                });
            }
            Ok(None) => {}
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed, treating as miss");
            }
        }

        let (grid, series) = self.fetch_with_degradation(bbox, nx, ny).await?;

        let times = series.times();
        let t_idx = nearest_time_index(times, hour_bucket(now))?;

        let samples: Vec<(f64, f64)> = (0..grid.len())
            .map(|idx| {
                series
                    .location(idx)
                    .and_then(|loc| loc.sample_at(t_idx))
                    .unwrap_or((0.0, 0.0))
            })
            .collect();

        let field = match build_wind_field(&grid, &samples, now) {
            Ok(field) => field,
            Err(e) => {
                warn!(error = %e, "Field assembly failed");
                return None;
            }
        };

        // Persist under the achieved resolution, not the requested one.
        let achieved_key = CacheKey::new(bbox, grid.nx(), grid.ny(), now);
        let entry = CacheEntry::new(&achieved_key, field.clone(), now);
        if let Err(e) = self.cache.put(&achieved_key, entry).await {
            warn!(key = %achieved_key, error = %e, "Cache write failed");
        }

        info!(
            nx = grid.nx(),
            ny = grid.ny(),
            requested_nx = nx,
            requested_ny = ny,
            "Wind field acquired from network"
        );

        Some(Acquired {
            field,
            origin: FieldOrigin::Network,
            nx: grid.nx(),
            ny: grid.ny(),
        })
    }

    /// Run the bounded retry loop; returns the grid actually used and the
    /// provider response, or `None` when the budget is exhausted or a
    /// terminal failure occurs.
    async fn fetch_with_degradation(
        &self,
        bbox: BoundingBox,
        nx: usize,
        ny: usize,
    ) -> Option<(SamplingGrid, PointSeries)> {
        let degradation = self.config.degradation;
        let max_attempts = self.config.max_attempts;

        let mut state =
            FetchState::Idle.apply(FetchEvent::Start { nx, ny }, degradation, max_attempts);
        let mut outcome = None;

        while let FetchState::Fetching {
            attempt,
            nx: cur_nx,
            ny: cur_ny,
        } = state
        {
            let grid = match SamplingGrid::build(bbox, cur_nx, cur_ny) {
                Ok(grid) => grid,
                Err(e) => {
                    warn!(error = %e, "Cannot build sampling grid");
                    return None;
                }
            };

            let class = match self.provider.fetch_points(grid.points()).await {
                Ok(series) => {
                    outcome = Some((grid, series));
                    ResponseClass::Success
                }
                Err(e) if e.is_degradable() => {
                    warn!(
                        attempt = attempt,
                        nx = cur_nx,
                        ny = cur_ny,
                        error = %e,
                        "Provider pushback, shrinking grid"
                    );
                    ResponseClass::Degradable
                }
                Err(e) => {
                    warn!(error = %e, "Terminal provider failure");
                    ResponseClass::Terminal
                }
            };

            state = state.apply(FetchEvent::Response(class), degradation, max_attempts);
            if matches!(state, FetchState::Backoff { .. }) {
                tokio::time::sleep(self.config.backoff).await;
                state = state.apply(FetchEvent::TimerElapsed, degradation, max_attempts);
            }
        }

        match state {
            FetchState::Succeeded { .. } => outcome,
            _ => {
                info!(requested_nx = nx, requested_ny = ny, "No wind data acquired");
                None
            }
        }
    }
}

/// Index of the series entry nearest the target hour: exact label match
/// first, else minimum absolute time difference (first occurrence wins
/// ties). Unparseable labels are skipped.
fn nearest_time_index(times: &[String], target: DateTime<Utc>) -> Option<usize> {
    let target_label = hour_key(target);
    if let Some(idx) = times.iter().position(|t| *t == target_label) {
        return Some(idx);
    }

    let mut best: Option<(usize, i64)> = None;
    for (idx, label) in times.iter().enumerate() {
        let Ok(dt) = parse_time_label(label) else {
            continue;
        };
        let diff = (dt - target).num_seconds().abs();
        if best.map_or(true, |(_, best_diff)| diff < best_diff) {
            best = Some((idx, diff));
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn target() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 7, 14, 0, 0).unwrap()
    }

    #[test]
    fn test_exact_label_match() {
        let times = vec![
            "2024-03-07T13:00".to_string(),
            "2024-03-07T14:00".to_string(),
            "2024-03-07T15:00".to_string(),
        ];
        assert_eq!(nearest_time_index(&times, target()), Some(1));
    }

    #[test]
    fn test_nearest_fallback() {
        let times = vec![
            "2024-03-07T10:00".to_string(),
            "2024-03-07T13:00".to_string(),
            "2024-03-07T18:00".to_string(),
        ];
        assert_eq!(nearest_time_index(&times, target()), Some(1));
    }

    #[test]
    fn test_tie_takes_first_occurrence() {
        let times = vec![
            "2024-03-07T13:00".to_string(),
            "2024-03-07T15:00".to_string(),
        ];
        assert_eq!(nearest_time_index(&times, target()), Some(0));
    }

    #[test]
    fn test_offset_labels_resolve_to_utc_instant() {
        // Labels carrying an explicit zone offset represent earlier UTC
        // instants; selection must follow the instant, not the label text.
        let times = vec![
            "2024-03-07T13:00:00+01:00".to_string(),
            "2024-03-07T14:00:00+01:00".to_string(),
            "2024-03-07T15:00:00+01:00".to_string(),
        ];
        assert_eq!(nearest_time_index(&times, target()), Some(2));
    }

    #[test]
    fn test_unparseable_labels_skipped() {
        let times = vec!["garbage".to_string(), "2024-03-07T16:00".to_string()];
        assert_eq!(nearest_time_index(&times, target()), Some(1));
    }

    #[test]
    fn test_empty_series() {
        assert_eq!(nearest_time_index(&[], target()), None);
    }
}
