//! Hazard provider port and the Opendatasoft records client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::departments::DEPARTMENT_CODES;
use crate::record::{pad_domain_id, Echeance, HazardRecord};

const DEFAULT_BASE_URL: &str = "https://public.opendatasoft.com/api/explore/v2.1/catalog/datasets/weatherref-france-vigilance-meteo-departement/records";

/// Severity levels queried, highest first. Green (1) is never fetched.
const QUERIED_LEVELS: [u8; 3] = [4, 3, 2];

#[derive(Debug, Error)]
pub enum VigilanceError {
    #[error("hazard feed returned status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Port for the hazard alert feed.
#[async_trait]
pub trait HazardProvider: Send + Sync {
    /// All active records for the given lead time,
    /// across every queried severity level.
    async fn fetch(&self, echeance: Echeance) -> Result<Vec<HazardRecord>, VigilanceError>;
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[allow(dead_code)]
    total_count: u64,
    results: Vec<HazardRecord>,
}

/// Client for the Opendatasoft vigilance dataset.
///
/// One range query per severity level of interest; the three result sets
/// are concatenated. Exact duplicates across queries are harmless because
/// aggregation is a max-reduction.
pub struct OpendatasoftClient {
    client: Client,
    base_url: String,
}

impl OpendatasoftClient {
    pub fn new() -> Result<Self, VigilanceError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, VigilanceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| VigilanceError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn where_clause(level: u8, echeance: Echeance) -> String {
        let domains = DEPARTMENT_CODES
            .iter()
            .map(|id| format!("'{}'", id))
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "color_id={} AND echeance='{}' AND domain_id IN ({})",
            level,
            echeance.as_tag(),
            domains
        )
    }

    async fn fetch_level(
        &self,
        level: u8,
        echeance: Echeance,
    ) -> Result<Vec<HazardRecord>, VigilanceError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("where", Self::where_clause(level, echeance)),
                ("limit", "100".to_string()),
            ])
            .send()
            .await
            .map_err(|e| VigilanceError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VigilanceError::Status(response.status().as_u16()));
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| VigilanceError::Malformed(e.to_string()))?;

        debug!(level = level, count = body.results.len(), "Fetched vigilance level");
        Ok(body.results)
    }
}

#[async_trait]
impl HazardProvider for OpendatasoftClient {
    #[instrument(skip(self))]
    async fn fetch(&self, echeance: Echeance) -> Result<Vec<HazardRecord>, VigilanceError> {
        let mut records = Vec::new();
        for level in QUERIED_LEVELS {
            match self.fetch_level(level, echeance).await {
                Ok(batch) => records.extend(batch),
                Err(e) => {
                    warn!(level = level, error = %e, "Vigilance level query failed");
                    return Err(e);
                }
            }
        }

        for record in &mut records {
            record.domain_id = pad_domain_id(&record.domain_id);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_where_clause_shape() {
        let clause = OpendatasoftClient::where_clause(4, Echeance::Today);
        assert!(clause.starts_with("color_id=4 AND echeance='J' AND domain_id IN ('01','02'"));
        assert!(clause.ends_with("'95')"));
        assert!(clause.contains("'2A','2B'"));
    }

    #[test]
    fn test_tomorrow_tag_in_clause() {
        let clause = OpendatasoftClient::where_clause(2, Echeance::Tomorrow);
        assert!(clause.contains("echeance='J1'"));
    }

    #[test]
    fn test_queried_levels_exclude_green() {
        assert!(!QUERIED_LEVELS.contains(&1));
        assert_eq!(QUERIED_LEVELS[0], 4);
    }
}
