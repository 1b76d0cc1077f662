//! Display configuration for the velocity overlay.
//!
//! Pure UI state: changing any of these re-renders the existing field
//! without touching the fetch pipeline.

use serde::{Deserialize, Serialize};

/// Named color-scale presets cycled by the palette control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorScale {
    White,
    DeepBlue,
    Spectral,
}

impl ColorScale {
    /// Ordered color stops handed to the velocity renderer.
    pub fn stops(&self) -> Vec<String> {
        match self {
            ColorScale::White => vec!["#ffffff".to_string()],
            ColorScale::DeepBlue => vec!["#282E82".to_string()],
            ColorScale::Spectral => [
                "#3288bd", "#66c2a5", "#abdda4", "#e6f598", "#fee08b", "#fdae61", "#f46d43",
                "#d53e4f",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }

    /// Cycle order: white -> deep blue -> spectral -> white.
    pub fn next(&self) -> ColorScale {
        match self {
            ColorScale::White => ColorScale::DeepBlue,
            ColorScale::DeepBlue => ColorScale::Spectral,
            ColorScale::Spectral => ColorScale::White,
        }
    }
}

/// Overlay display state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Particle density slider position, 1..=8000.
    pub particle_density: u32,
    /// Stroke width of drawn particles.
    pub line_width: f64,
    pub color_scale: ColorScale,
    pub dark_mode: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            particle_density: 4000,
            line_width: 1.0,
            color_scale: ColorScale::DeepBlue,
            dark_mode: false,
        }
    }
}

impl RenderConfig {
    /// Slider position mapped to the renderer's particle multiplier.
    /// Day mode doubles the multiplier for visibility over light tiles.
    pub fn particle_multiplier(&self) -> f64 {
        let base = self.particle_density as f64 / 500_000.0;
        if self.dark_mode {
            base
        } else {
            base * 2.0
        }
    }

    /// Effective stroke width; day mode widens strokes by half.
    pub fn effective_line_width(&self) -> f64 {
        if self.dark_mode {
            self.line_width
        } else {
            self.line_width * 1.5
        }
    }
}
