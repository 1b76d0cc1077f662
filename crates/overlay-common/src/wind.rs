//! Wind vector field types.
//!
//! A [`WindField`] is the two-band (u, v) raster handed to the velocity
//! rendering collaborator. Header field names follow the GRIB-flavored JSON
//! convention that collaborator expects, hence the camelCase serde names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::error::OverlayError;

/// Which velocity component a band carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindQuantity {
    /// Eastward component (GRIB parameter number 2).
    U,
    /// Northward component (GRIB parameter number 3).
    V,
}

impl WindQuantity {
    pub fn parameter_number(&self) -> u8 {
        match self {
            WindQuantity::U => 2,
            WindQuantity::V => 3,
        }
    }
}

/// Geographic and physical metadata for one band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandHeader {
    pub nx: usize,
    pub ny: usize,
    /// Latitude of the first (northernmost) row.
    pub la1: f64,
    /// Longitude of the first (westernmost) column.
    pub lo1: f64,
    /// Latitude of the last row.
    pub la2: f64,
    /// Longitude of the last column.
    pub lo2: f64,
    pub dx: f64,
    pub dy: f64,
    pub parameter_category: u8,
    pub parameter_number: u8,
    pub parameter_unit: String,
    pub ref_time: DateTime<Utc>,
}

impl BandHeader {
    /// Build a header for one quantity over the given extent.
    pub fn new(
        quantity: WindQuantity,
        bbox: &BoundingBox,
        nx: usize,
        ny: usize,
        dx: f64,
        dy: f64,
        ref_time: DateTime<Utc>,
    ) -> Self {
        Self {
            nx,
            ny,
            la1: bbox.top,
            lo1: bbox.left,
            la2: bbox.bottom,
            lo2: bbox.right,
            dx,
            dy,
            parameter_category: 2,
            parameter_number: quantity.parameter_number(),
            parameter_unit: "km/h".to_string(),
            ref_time,
        }
    }

    /// True when two headers describe the same geometry (everything but the
    /// quantity identifier).
    pub fn same_geometry(&self, other: &BandHeader) -> bool {
        self.nx == other.nx
            && self.ny == other.ny
            && self.la1 == other.la1
            && self.lo1 == other.lo1
            && self.la2 == other.la2
            && self.lo2 == other.lo2
            && self.dx == other.dx
            && self.dy == other.dy
    }
}

/// One component band: header plus row-major values, one per grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldBand {
    pub header: BandHeader,
    pub data: Vec<f64>,
}

/// The assembled two-band vector field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindField {
    pub u: FieldBand,
    pub v: FieldBand,
}

impl WindField {
    /// Assemble a field from two bands, validating the shared-geometry and
    /// length invariants.
    pub fn new(u: FieldBand, v: FieldBand) -> Result<Self, OverlayError> {
        let expected = u.header.nx * u.header.ny;
        if u.data.len() != expected || v.data.len() != expected {
            return Err(OverlayError::FieldMismatch(format!(
                "band length {}/{} does not match {}x{} grid",
                u.data.len(),
                v.data.len(),
                u.header.nx,
                u.header.ny
            )));
        }
        if !u.header.same_geometry(&v.header) {
            return Err(OverlayError::FieldMismatch(
                "u and v bands carry different geographic headers".to_string(),
            ));
        }
        Ok(Self { u, v })
    }

    pub fn nx(&self) -> usize {
        self.u.header.nx
    }

    pub fn ny(&self) -> usize {
        self.u.header.ny
    }
}

/// Decompose a meteorological (speed, direction) sample into (u, v).
///
/// Direction is degrees clockwise from north and names where the wind comes
/// *from*, so both components are negated.
pub fn wind_vector(speed: f64, direction_deg: f64) -> (f64, f64) {
    let theta = direction_deg.to_radians();
    (-speed * theta.sin(), -speed * theta.cos())
}
