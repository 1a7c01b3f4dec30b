use serde::{Deserialize, Serialize};

use crate::error::{CaptureError, CaptureResult};

/// One transform applied identically to every frame of a burst before it is
/// placed on the composite canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MosaicTransform {
    pub rotation_degrees: f32,
    pub scale: f32,
    pub pan_x: f32,
    pub pan_y: f32,
    pub crop_width: u32,
    pub crop_height: u32,
    pub columns: u32,
    pub gap_x: u32,
    pub gap_y: u32,
}

impl Default for MosaicTransform {
    fn default() -> Self {
        Self {
            rotation_degrees: 0.0,
            scale: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            crop_width: 200,
            crop_height: 300,
            columns: 8,
            gap_x: 0,
            gap_y: 0,
        }
    }
}

impl MosaicTransform {
    pub fn validate(&self) -> CaptureResult<()> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(CaptureError::InvalidTransform(format!(
                "scale must be positive, got {}",
                self.scale
            )));
        }
        if !(self.rotation_degrees.is_finite() && self.pan_x.is_finite() && self.pan_y.is_finite())
        {
            return Err(CaptureError::InvalidTransform(
                "rotation and pan must be finite".into(),
            ));
        }
        if self.crop_width == 0 || self.crop_height == 0 {
            return Err(CaptureError::InvalidTransform(format!(
                "crop must be non-empty, got {}x{}",
                self.crop_width, self.crop_height
            )));
        }
        if self.columns == 0 {
            return Err(CaptureError::InvalidTransform(
                "at least one column is required".into(),
            ));
        }
        Ok(())
    }
}

/// Compositor knobs that are not part of the per-burst transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompositorConfig {
    /// Single-column composites with a crop strictly shorter than this are
    /// rendered as kymograms.
    pub kymogram_max_height: u32,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            kymogram_max_height: 5,
        }
    }
}

impl CompositorConfig {
    pub fn is_kymogram(&self, transform: &MosaicTransform) -> bool {
        transform.columns == 1 && transform.crop_height < self.kymogram_max_height
    }
}
