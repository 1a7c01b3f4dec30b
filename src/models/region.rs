use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum MaskShape {
    Rectangle,
    #[default]
    Ellipse,
}

impl MaskShape {
    pub fn toggled(self) -> Self {
        match self {
            MaskShape::Rectangle => MaskShape::Ellipse,
            MaskShape::Ellipse => MaskShape::Rectangle,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MaskShape::Rectangle => "rectangle",
            MaskShape::Ellipse => "ellipse",
        }
    }
}

/// Illuminated area found inside a frame, in native pixel coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub shape: MaskShape,
}

impl Region {
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }
}
