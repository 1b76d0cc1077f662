//! Record filtering, applied before aggregation so the aggregate always
//! reflects the active selection.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::HazardRecord;

/// Active filter selection. Empty filters pass everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HazardFilters {
    /// Keep only this department code.
    pub department: Option<String>,
    /// Keep only this phenomenon.
    pub phenomenon_id: Option<u32>,
    /// Keep only records whose begin date matches.
    pub date: Option<NaiveDate>,
}

impl HazardFilters {
    pub fn is_empty(&self) -> bool {
        self.department.is_none() && self.phenomenon_id.is_none() && self.date.is_none()
    }

    pub fn matches(&self, record: &HazardRecord) -> bool {
        if let Some(dept) = &self.department {
            if record.domain_id != *dept {
                return false;
            }
        }
        if let Some(phenomenon) = self.phenomenon_id {
            if record.phenomenon_id != phenomenon {
                return false;
            }
        }
        if let Some(date) = self.date {
            if record.begin_time.date_naive() != date {
                return false;
            }
        }
        true
    }

    /// Apply to a record set, preserving input order.
    pub fn apply(&self, records: &[HazardRecord]) -> Vec<HazardRecord> {
        records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }
}
