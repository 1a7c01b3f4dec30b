use serde::{Deserialize, Serialize};

/// Tunable thresholds for locating the lit fiber bundle in a frame.
///
/// Defaults were tuned against a handful of fiberscopes; they are knobs, not
/// calibrated constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DetectorConfig {
    /// Sample every `stride`-th pixel along both axes
    pub stride: u32,

    /// A sample is lit when max(R, G, B) is strictly above this value
    pub brightness_threshold: u8,

    /// Margin added around the lit bounding box before clamping
    pub padding: u32,

    /// Padded boxes this small (or smaller) on either axis are rejected
    pub min_size: u32,

    /// Aspect ratio window (inclusive) classified as an ellipse
    pub ellipse_ratio_min: f64,
    pub ellipse_ratio_max: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            stride: 4,
            brightness_threshold: 25,
            padding: 20,
            min_size: 50,
            ellipse_ratio_min: 0.8,
            ellipse_ratio_max: 1.2,
        }
    }
}
