//! Common types shared across the meteo-overlay crates.

pub mod bbox;
pub mod error;
pub mod grid;
pub mod style;
pub mod time;
pub mod wind;

pub use bbox::{BoundingBox, FRANCE};
pub use error::{OverlayError, OverlayResult};
pub use grid::{SamplePoint, SamplingGrid};
pub use style::{ColorScale, RenderConfig};
pub use time::{hour_bucket, hour_key};
pub use wind::{BandHeader, FieldBand, WindField, WindQuantity};
