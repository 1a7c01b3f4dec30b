use chrono::{DateTime, Utc};
use image::RgbaImage;

/// One raster grabbed from the camera at native resolution.
///
/// Frames are never mutated once created; whoever holds one owns it for the
/// duration of a single operation (detection, masking, persistence).
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbaImage,
    captured_at: DateTime<Utc>,
}

impl Frame {
    pub fn new(image: RgbaImage, captured_at: DateTime<Utc>) -> Self {
        Self { image, captured_at }
    }

    /// Wraps `image` stamped with the current wall clock.
    pub fn now(image: RgbaImage) -> Self {
        Self::new(image, Utc::now())
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}

/// Live camera feed consumed by the capture core.
///
/// `None` means the device has no frame ready yet (stream still starting,
/// exposure settling); callers treat it as "try again next tick".
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<Frame>;
}

impl<F> FrameSource for F
where
    F: FnMut() -> Option<Frame>,
{
    fn next_frame(&mut self) -> Option<Frame> {
        self()
    }
}
