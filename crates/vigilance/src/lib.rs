//! Department-level weather vigilance: hazard records, severity
//! aggregation, boundary geometry, and zoom-adaptive icon sizing.

pub mod aggregate;
pub mod departments;
pub mod filter;
pub mod geometry;
pub mod icon;
pub mod provider;
pub mod record;
pub mod severity;

pub use aggregate::{aggregate, SeverityMap};
pub use departments::{department_name, DEPARTMENT_CODES};
pub use filter::HazardFilters;
pub use geometry::{haversine_m, parse_regions, RegionShape};
pub use icon::IconScaler;
pub use provider::{HazardProvider, OpendatasoftClient, VigilanceError};
pub use record::{Echeance, HazardRecord, WHOLE_COUNTRY};
pub use severity::{phenomenon_glyph, severity_color, severity_label};
