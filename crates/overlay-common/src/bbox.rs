//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

use crate::error::OverlayError;

/// A geographic bounding box in degrees.
///
/// Edges are named after their compass role: `top` is the northern
/// latitude, `left` the western longitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

/// Metropolitan France, the default overlay extent.
pub const FRANCE: BoundingBox = BoundingBox {
    top: 51.1,
    bottom: 41.3,
    left: -5.5,
    right: 9.8,
};

impl BoundingBox {
    /// Create a bounding box, enforcing top > bottom and right > left.
    pub fn new(top: f64, bottom: f64, left: f64, right: f64) -> Result<Self, OverlayError> {
        if !(top > bottom && right > left) {
            return Err(OverlayError::InvalidBbox(format!(
                "degenerate extent: top={} bottom={} left={} right={}",
                top, bottom, left, right
            )));
        }
        Ok(Self {
            top,
            bottom,
            left,
            right,
        })
    }

    /// East-west extent in degrees.
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// North-south extent in degrees.
    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    /// Check if a point is contained within this bbox.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat <= self.top && lat >= self.bottom && lon >= self.left && lon <= self.right
    }

    /// Geographic center as (lat, lon).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.top + self.bottom) / 2.0,
            (self.left + self.right) / 2.0,
        )
    }

    /// Generate the cache key fragment for this bbox:
    /// `<left>,<right>,<bottom>,<top>`.
    pub fn cache_key(&self) -> String {
        format!("{},{},{},{}", self.left, self.right, self.bottom, self.top)
    }
}
