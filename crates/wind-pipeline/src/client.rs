//! Open-Meteo HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

use overlay_common::SamplePoint;

use crate::provider::{LocationSeries, PointSeries, ProviderError, WindProvider};

const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";
const HOURLY_VARS: &str = "wind_speed_10m,wind_direction_10m";

/// Client for the Open-Meteo point-forecast endpoint.
///
/// All sample coordinates go into one GET as comma-joined latitude and
/// longitude lists; the free tier answers 429 or 414 when the list grows
/// too large, which the orchestrator handles by shrinking the grid.
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
}

impl OpenMeteoClient {
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn build_url(&self, points: &[SamplePoint]) -> String {
        let lats: Vec<String> = points.iter().map(|p| p.lat.to_string()).collect();
        let lons: Vec<String> = points.iter().map(|p| p.lon.to_string()).collect();
        // Time labels must be UTC: the orchestrator matches them against a
        // UTC hour bucket, and naive labels parse as UTC downstream.
        format!(
            "{}?latitude={}&longitude={}&hourly={}&timezone=UTC",
            self.base_url,
            lats.join(","),
            lons.join(","),
            HOURLY_VARS
        )
    }

    fn parse_body(body: serde_json::Value) -> Result<PointSeries, ProviderError> {
        // The endpoint returns an object for one location, an array for
        // several. Series arrays may sit under "hourly" or at the top level.
        fn location(value: &serde_json::Value) -> LocationSeries {
            let nested = value.get("hourly").unwrap_or(value);
            serde_json::from_value(nested.clone()).unwrap_or_default()
        }

        let series = match &body {
            serde_json::Value::Array(items) => {
                PointSeries::Many(items.iter().map(location).collect())
            }
            serde_json::Value::Object(_) => PointSeries::Single(location(&body)),
            other => {
                return Err(ProviderError::Malformed(format!(
                    "unexpected JSON shape: {}",
                    other
                )))
            }
        };

        if series.times().is_empty() {
            return Err(ProviderError::Malformed(
                "response carries no time series".to_string(),
            ));
        }
        Ok(series)
    }
}

#[async_trait]
impl WindProvider for OpenMeteoClient {
    #[instrument(skip(self, points), fields(point_count = points.len()))]
    async fn fetch_points(&self, points: &[SamplePoint]) -> Result<PointSeries, ProviderError> {
        let url = self.build_url(points);
        debug!(url_len = url.len(), "Requesting wind samples");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::TOO_MANY_REQUESTS => return Err(ProviderError::RateLimited),
            StatusCode::URI_TOO_LONG => return Err(ProviderError::UriTooLong),
            status => return Err(ProviderError::Status(status.as_u16())),
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        Self::parse_body(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_url_joins_coordinates() {
        let client = OpenMeteoClient::with_base_url("http://localhost/v1/forecast").unwrap();
        let points = vec![
            SamplePoint { lat: 51.1, lon: -5.5 },
            SamplePoint { lat: 41.3, lon: 9.8 },
        ];
        let url = client.build_url(&points);
        assert_eq!(
            url,
            "http://localhost/v1/forecast?latitude=51.1,41.3&longitude=-5.5,9.8&hourly=wind_speed_10m,wind_direction_10m&timezone=UTC"
        );
    }

    #[test]
    fn test_request_pins_utc_labels() {
        // Local-timezone labels would be matched against a UTC hour bucket
        // and land on the wrong sample; the request must say so explicitly.
        let client = OpenMeteoClient::with_base_url("http://localhost/v1/forecast").unwrap();
        let url = client.build_url(&[SamplePoint { lat: 46.6, lon: 2.2 }]);
        assert!(url.ends_with("&timezone=UTC"));
        assert!(!url.contains("timezone=auto"));
    }

    #[test]
    fn test_parse_single_object_response() {
        let body = json!({
            "latitude": 46.6,
            "hourly": {
                "time": ["2024-03-07T14:00"],
                "wind_speed_10m": [12.5],
                "wind_direction_10m": [270.0]
            }
        });
        let series = OpenMeteoClient::parse_body(body).unwrap();
        assert_eq!(series.times(), ["2024-03-07T14:00"]);
        assert_eq!(series.location(0).unwrap().sample_at(0), Some((12.5, 270.0)));
    }

    #[test]
    fn test_parse_array_response() {
        let body = json!([
            {"hourly": {"time": ["2024-03-07T14:00"], "wind_speed_10m": [5.0], "wind_direction_10m": [0.0]}},
            {"hourly": {"time": ["2024-03-07T14:00"], "wind_speed_10m": [7.0], "wind_direction_10m": [90.0]}}
        ]);
        let series = OpenMeteoClient::parse_body(body).unwrap();
        assert_eq!(series.location(1).unwrap().sample_at(0), Some((7.0, 90.0)));
        assert!(series.location(2).is_none());
    }

    #[test]
    fn test_parse_missing_times_is_malformed() {
        let body = json!({"hourly": {"wind_speed_10m": [1.0]}});
        assert!(matches!(
            OpenMeteoClient::parse_body(body),
            Err(ProviderError::Malformed(_))
        ));
    }
}
