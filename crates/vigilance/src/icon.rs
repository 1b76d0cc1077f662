//! Zoom-adaptive icon sizing.
//!
//! A marker's base size comes from the physical extent of the region it
//! labels, so small departments never get oversized icons. The base is
//! then scaled exponentially with the map zoom level so markers track the
//! apparent size of their regions as the user zooms.

/// Smallest base marker size in pixels.
const MIN_SIZE: f64 = 20.0;
/// Largest base marker size in pixels.
const MAX_SIZE: f64 = 40.0;
/// Region diagonal (meters) at or below which the base size bottoms out.
const MIN_DIAGONAL_M: f64 = 70_000.0;
/// Region diagonal (meters) at or above which the base size tops out.
const MAX_DIAGONAL_M: f64 = 600_000.0;
/// Zoom level at which the zoom factor is exactly 1.
const BASE_ZOOM: f64 = 4.5;
/// Per-zoom-level growth of the zoom factor.
const ZOOM_GROWTH: f64 = 1.5;

/// Computes marker pixel sizes from region extent and map zoom.
#[derive(Debug, Clone, Copy, Default)]
pub struct IconScaler;

impl IconScaler {
    pub fn new() -> Self {
        IconScaler
    }

    /// Base marker size for a region with the given diagonal extent,
    /// linearly interpolated between the size bounds and clamped.
    pub fn base_size(&self, diagonal_m: f64) -> u32 {
        let t = ((diagonal_m - MIN_DIAGONAL_M) / (MAX_DIAGONAL_M - MIN_DIAGONAL_M))
            .clamp(0.0, 1.0);
        (MIN_SIZE + t * (MAX_SIZE - MIN_SIZE)).round() as u32
    }

    /// Multiplier applied on top of the base size at a given zoom level.
    pub fn zoom_factor(&self, zoom: f64) -> f64 {
        ZOOM_GROWTH.powf(zoom - BASE_ZOOM)
    }

    /// Final glyph size in pixels for a region at a zoom level.
    pub fn glyph_size(&self, diagonal_m: f64, zoom: f64) -> u32 {
        let base = self.base_size(diagonal_m) as f64;
        ((base / 2.0) * self.zoom_factor(zoom)).round() as u32
    }
}
