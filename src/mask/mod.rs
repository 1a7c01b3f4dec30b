pub mod interaction;
pub mod render;

pub use interaction::{to_native_delta, DragMode, DragState, MaskInteraction};
pub use render::apply_mask;

use serde::{Deserialize, Serialize};

use crate::models::{MaskShape, Region};

/// Smallest mask edge, in native pixels.
pub const MIN_MASK_SIZE: f64 = 50.0;

const DEFAULT_ORIGIN: f64 = 100.0;
const DEFAULT_SIZE: f64 = 400.0;

/// The user-adjustable region kept when a single photo is taken.
///
/// Coordinates are native frame pixels, stored as floats so that slow drags
/// (sub-pixel deltas after display rescaling) still accumulate. Every mutator
/// re-clamps the mask into the frame and enforces the minimum size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureMask {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    shape: MaskShape,
    active: bool,
    frame_width: u32,
    frame_height: u32,
}

impl CaptureMask {
    pub fn new(frame_width: u32, frame_height: u32, active: bool) -> Self {
        let mut mask = Self {
            x: DEFAULT_ORIGIN,
            y: DEFAULT_ORIGIN,
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            shape: MaskShape::Ellipse,
            active,
            frame_width,
            frame_height,
        };
        mask.normalize();
        mask
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn shape(&self) -> MaskShape {
        self.shape
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn frame_size(&self) -> (u32, u32) {
        (self.frame_width, self.frame_height)
    }

    /// Integer pixel rectangle `(x, y, width, height)` used for rendering.
    pub fn pixel_rect(&self) -> (u32, u32, u32, u32) {
        let x = self.x.round() as u32;
        let y = self.y.round() as u32;
        let width = (self.width.round() as u32)
            .min(self.frame_width.saturating_sub(x))
            .max(1);
        let height = (self.height.round() as u32)
            .min(self.frame_height.saturating_sub(y))
            .max(1);
        (x, y, width, height)
    }

    /// Adopts a detected region; detection also switches the mask on.
    pub fn set_from_region(&mut self, region: Region) {
        self.x = region.x as f64;
        self.y = region.y as f64;
        self.width = region.width as f64;
        self.height = region.height as f64;
        self.shape = region.shape;
        self.active = true;
        self.normalize();
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.x += dx;
        self.y += dy;
        self.normalize();
    }

    /// Grows or shrinks the mask from its top-left corner.
    pub fn resize(&mut self, d_width: f64, d_height: f64) {
        if !d_width.is_finite() || !d_height.is_finite() {
            return;
        }
        let (min_w, min_h) = self.min_size();
        self.width = (self.width + d_width).max(min_w);
        self.height = (self.height + d_height).max(min_h);
        // Growth past the frame edge is absorbed here instead of pushing the
        // origin, so a resize never moves the mask.
        self.width = self.width.min(self.frame_width as f64 - self.x).max(min_w);
        self.height = self.height.min(self.frame_height as f64 - self.y).max(min_h);
        self.normalize();
    }

    pub fn toggle_shape(&mut self) {
        self.shape = self.shape.toggled();
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Re-fits the mask after the camera changed resolution.
    pub fn set_frame_size(&mut self, frame_width: u32, frame_height: u32) {
        self.frame_width = frame_width;
        self.frame_height = frame_height;
        self.normalize();
    }

    fn min_size(&self) -> (f64, f64) {
        (
            MIN_MASK_SIZE.min(self.frame_width as f64),
            MIN_MASK_SIZE.min(self.frame_height as f64),
        )
    }

    fn normalize(&mut self) {
        let frame_w = self.frame_width as f64;
        let frame_h = self.frame_height as f64;
        let (min_w, min_h) = self.min_size();

        self.width = self.width.clamp(min_w, frame_w.max(min_w));
        self.height = self.height.clamp(min_h, frame_h.max(min_h));
        self.x = self.x.clamp(0.0, (frame_w - self.width).max(0.0));
        self.y = self.y.clamp(0.0, (frame_h - self.height).max(0.0));
    }
}
