//! Sampling grid construction for wind queries.

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::error::OverlayError;

/// A single geographic sample position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub lat: f64,
    pub lon: f64,
}

/// A regular lat/lon lattice over a bounding box.
///
/// Points are row-major starting at the top-left corner: latitude decreases
/// as the row index grows, longitude increases left to right. Immutable once
/// built; a resolution change means building a new grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingGrid {
    nx: usize,
    ny: usize,
    dx: f64,
    dy: f64,
    bbox: BoundingBox,
    points: Vec<SamplePoint>,
}

impl SamplingGrid {
    /// Build a grid with `nx` columns and `ny` rows over `bbox`.
    ///
    /// Both dimensions must be at least 2; step sizes are
    /// dx = width/(nx-1) and dy = height/(ny-1) so the outermost points sit
    /// exactly on the bbox edges.
    pub fn build(bbox: BoundingBox, nx: usize, ny: usize) -> Result<Self, OverlayError> {
        if nx < 2 || ny < 2 {
            return Err(OverlayError::InvalidGrid(format!(
                "resolution must be at least 2x2, got {}x{}",
                nx, ny
            )));
        }

        let dx = bbox.width() / (nx - 1) as f64;
        let dy = bbox.height() / (ny - 1) as f64;

        let mut points = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            let lat = bbox.top - j as f64 * dy;
            for i in 0..nx {
                let lon = bbox.left + i as f64 * dx;
                points.push(SamplePoint { lat, lon });
            }
        }

        Ok(Self {
            nx,
            ny,
            dx,
            dy,
            bbox,
            points,
        })
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn dx(&self) -> f64 {
        self.dx
    }

    pub fn dy(&self) -> f64 {
        self.dy
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// All sample positions in row-major order.
    pub fn points(&self) -> &[SamplePoint] {
        &self.points
    }

    /// Total number of grid points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
