//! Hazard record types from the vigilance feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Domain code for the country-wide synthesis record; never rendered as a
/// region and excluded before aggregation.
pub const WHOLE_COUNTRY: &str = "FRA";

/// Lead-time tag of a vigilance bulletin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Echeance {
    Today,
    Tomorrow,
}

impl Echeance {
    /// The tag as the upstream feed spells it.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Echeance::Today => "J",
            Echeance::Tomorrow => "J1",
        }
    }
}

/// One vigilance record as retrieved upstream. Immutable once fetched.
///
/// `color_id` is the ordinal severity: 2 yellow, 3 orange, 4 red;
/// higher is worse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardRecord {
    pub domain_id: String,
    pub echeance: String,
    pub phenomenon_id: u32,
    pub phenomenon: String,
    pub color_id: u8,
    pub color: String,
    pub begin_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub product_datetime: DateTime<Utc>,
}

impl HazardRecord {
    /// Upstream sometimes drops the leading zero from numeric department
    /// codes; normalize to the two-character form.
    pub fn normalized_domain_id(&self) -> String {
        pad_domain_id(&self.domain_id)
    }
}

/// Left-pad a numeric domain code to width 2 (`"1"` -> `"01"`); Corsican
/// codes (`"2A"`, `"2B"`) and `"FRA"` pass through untouched.
pub fn pad_domain_id(code: &str) -> String {
    if code.len() == 1 {
        format!("0{}", code)
    } else {
        code.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echeance_tags() {
        assert_eq!(Echeance::Today.as_tag(), "J");
        assert_eq!(Echeance::Tomorrow.as_tag(), "J1");
    }

    #[test]
    fn test_pad_domain_id() {
        assert_eq!(pad_domain_id("1"), "01");
        assert_eq!(pad_domain_id("13"), "13");
        assert_eq!(pad_domain_id("2A"), "2A");
        assert_eq!(pad_domain_id("FRA"), "FRA");
    }
}
