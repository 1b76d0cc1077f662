//! The wind provider port and its response model.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use overlay_common::SamplePoint;

/// How a provider attempt can fail.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// 429: too many requests. Recoverable by shrinking the grid.
    #[error("provider rate limited the request (429)")]
    RateLimited,

    /// 414: the coordinate list made the URI too long. Recoverable the
    /// same way.
    #[error("request URI too long (414)")]
    UriTooLong,

    /// Any other non-success status. Terminal for this acquisition.
    #[error("provider returned status {0}")]
    Status(u16),

    /// Connection-level failure; treated like rate limiting.
    #[error("transport error: {0}")]
    Transport(String),

    /// A 2xx body we cannot make sense of. Terminal.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Whether the degrade-and-retry ladder applies.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited | ProviderError::UriTooLong | ProviderError::Transport(_)
        )
    }
}

/// Hourly series arrays for one location. Missing arrays deserialize to
/// empty, which downstream extraction maps to zero vectors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationSeries {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_direction_10m: Vec<Option<f64>>,
}

impl LocationSeries {
    /// The (speed, direction) pair at a time index, if both are present.
    pub fn sample_at(&self, t_idx: usize) -> Option<(f64, f64)> {
        let speed = self.wind_speed_10m.get(t_idx).copied().flatten()?;
        let direction = self.wind_direction_10m.get(t_idx).copied().flatten()?;
        Some((speed, direction))
    }
}

/// A provider response covering every requested sample point.
///
/// The upstream API answers with a single object for one point and an array
/// for several; the single form is shared across all points.
#[derive(Debug, Clone)]
pub enum PointSeries {
    Single(LocationSeries),
    Many(Vec<LocationSeries>),
}

impl PointSeries {
    /// Series for the point at `idx`, if the response covers it.
    pub fn location(&self, idx: usize) -> Option<&LocationSeries> {
        match self {
            PointSeries::Single(loc) => Some(loc),
            PointSeries::Many(locs) => locs.get(idx),
        }
    }

    /// Time labels of the series, taken from the first location.
    pub fn times(&self) -> &[String] {
        match self {
            PointSeries::Single(loc) => &loc.time,
            PointSeries::Many(locs) => locs.first().map(|l| l.time.as_slice()).unwrap_or(&[]),
        }
    }
}

/// Port for the wind data provider. One call carries every sample
/// coordinate of the current grid.
#[async_trait]
pub trait WindProvider: Send + Sync {
    async fn fetch_points(&self, points: &[SamplePoint]) -> Result<PointSeries, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_at_missing_data() {
        let series = LocationSeries {
            time: vec!["2024-03-07T14:00".to_string()],
            wind_speed_10m: vec![Some(12.0)],
            wind_direction_10m: vec![None],
        };
        assert!(series.sample_at(0).is_none());
        assert!(series.sample_at(5).is_none());
    }

    #[test]
    fn test_single_response_covers_all_points() {
        let series = PointSeries::Single(LocationSeries::default());
        assert!(series.location(0).is_some());
        assert!(series.location(63).is_some());
    }

    #[test]
    fn test_many_response_bounds() {
        let series = PointSeries::Many(vec![LocationSeries::default(); 2]);
        assert!(series.location(1).is_some());
        assert!(series.location(2).is_none());
    }

    #[test]
    fn test_degradable_classification() {
        assert!(ProviderError::RateLimited.is_degradable());
        assert!(ProviderError::UriTooLong.is_degradable());
        assert!(ProviderError::Transport("reset".into()).is_degradable());
        assert!(!ProviderError::Status(500).is_degradable());
        assert!(!ProviderError::Malformed("empty".into()).is_degradable());
    }
}
