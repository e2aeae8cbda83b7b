//! View configuration: paint defaults, LOD thresholds and camera limits.

use crate::error::MapError;
use crate::style::{ARGB_BLACK, ARGB_BLUE, ARGB_WHITE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Paint defaults, LOD thresholds and camera limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Default fill, `0xAARRGGBB`.
    pub fill_color: u32,
    /// Default stroke, `0xAARRGGBB`.
    pub stroke_color: u32,
    /// Stroke width in pixels.
    pub stroke_width: f32,
    /// Colour each frame is cleared to.
    pub background_color: u32,

    /// Zoom thresholds a simplified level is generated for.
    pub zoom_levels: Vec<f32>,
    /// Simplification distance in pixels at zoom 1.
    pub cutoff_distance: f32,

    /// Smallest zoom factor.
    pub min_scale: f32,
    /// Largest zoom factor.
    pub max_scale: f32,

    /// Pause between render-loop iterations.
    pub frame_interval_ms: u64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            fill_color: ARGB_BLUE,
            stroke_color: ARGB_BLACK,
            stroke_width: 1.0,
            background_color: ARGB_WHITE,
            zoom_levels: vec![1.0, 3.0, 5.0],
            cutoff_distance: 3.0,
            min_scale: 1.0,
            max_scale: 5.0,
            frame_interval_ms: 15,
        }
    }
}

impl ViewConfig {
    /// Parse and validate JSON.
    pub fn from_json_str(json: &str) -> Result<Self, MapError> {
        let config: ViewConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let txt = std::fs::read_to_string(path)
            .with_context(|| format!("Reading view config {}", path.display()))?;
        Self::from_json_str(&txt)
            .with_context(|| format!("Parsing view config {}", path.display()))
    }

    /// Reject limits the camera or LOD generation cannot use.
    pub fn validate(&self) -> Result<(), MapError> {
        let invalid = |msg: String| Err(MapError::InvalidConfig(msg));

        if !(self.min_scale.is_finite() && self.min_scale > 0.0) {
            return invalid(format!("min_scale must be positive, got {}", self.min_scale));
        }
        if !(self.max_scale.is_finite() && self.max_scale >= self.min_scale) {
            return invalid(format!(
                "max_scale ({}) must be at least min_scale ({})",
                self.max_scale, self.min_scale
            ));
        }
        if !(self.cutoff_distance.is_finite() && self.cutoff_distance > 0.0) {
            return invalid(format!(
                "cutoff_distance must be positive, got {}",
                self.cutoff_distance
            ));
        }
        if let Some(z) = self
            .zoom_levels
            .iter()
            .find(|z| !(z.is_finite() && **z > 0.0))
        {
            return invalid(format!("zoom level {z} must be positive"));
        }
        if self.stroke_width < 0.0 {
            return invalid(format!("stroke_width must not be negative, got {}", self.stroke_width));
        }
        Ok(())
    }

    /// `frame_interval_ms` as a duration.
    #[inline]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}
