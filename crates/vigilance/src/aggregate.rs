//! Severity aggregation: many overlapping records down to one rendering
//! decision per region.

use std::collections::HashMap;

use tracing::debug;

use crate::record::{HazardRecord, WHOLE_COUNTRY};

/// The per-region aggregate: the dominant record for coloring, the full
/// list for popup detail. Derived, never stored; recomputed whenever the
/// record set (or the active filters upstream of it) changes.
#[derive(Debug, Clone, Default)]
pub struct SeverityMap {
    top: HashMap<String, HazardRecord>,
    by_region: HashMap<String, Vec<HazardRecord>>,
}

impl SeverityMap {
    /// The maximum-severity record for a region.
    pub fn dominant(&self, region: &str) -> Option<&HazardRecord> {
        self.top.get(region)
    }

    /// All records for a region, sorted by severity descending.
    pub fn records(&self, region: &str) -> &[HazardRecord] {
        self.by_region.get(region).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Region codes carrying at least one record.
    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.top.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.top.len()
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_empty()
    }
}

/// Reduce records to per-region aggregates in one pass.
///
/// The dominant record is a stable left-fold maximum on `color_id`: ties
/// keep the first-seen record. The whole-country synthesis code is not a
/// renderable region and is dropped here regardless of upstream filtering.
pub fn aggregate<I>(records: I) -> SeverityMap
where
    I: IntoIterator<Item = HazardRecord>,
{
    let mut map = SeverityMap::default();

    for record in records {
        if record.domain_id == WHOLE_COUNTRY {
            continue;
        }
        let region = record.domain_id.clone();

        match map.top.get(&region) {
            Some(current) if current.color_id >= record.color_id => {}
            _ => {
                map.top.insert(region.clone(), record.clone());
            }
        }
        map.by_region.entry(region).or_default().push(record);
    }

    for records in map.by_region.values_mut() {
        records.sort_by(|a, b| b.color_id.cmp(&a.color_id));
    }

    debug!(regions = map.len(), "Aggregated hazard records");
    map
}
