use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};

use super::transform::MosaicTransform;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Builds the frame-to-slice mapping.
///
/// Mirrors the interactive editor's preview exactly: move to the slice
/// center, pan, rotate, scale, then draw the frame centered on the origin.
/// Changing the order would bake something other than what was previewed.
pub fn slice_projection(frame_size: (u32, u32), transform: &MosaicTransform) -> Projection {
    let (frame_w, frame_h) = frame_size;
    let theta = transform.rotation_degrees.to_radians();

    Projection::translate(-(frame_w as f32) / 2.0, -(frame_h as f32) / 2.0)
        .and_then(Projection::scale(transform.scale, transform.scale))
        .and_then(Projection::rotate(theta))
        .and_then(Projection::translate(transform.pan_x, transform.pan_y))
        .and_then(Projection::translate(
            transform.crop_width as f32 / 2.0,
            transform.crop_height as f32 / 2.0,
        ))
}

/// Renders one `crop_width x crop_height` slice of `frame` into `out`.
///
/// Areas the transformed frame does not cover stay transparent, so they pick
/// up the canvas background when the slice is placed.
pub fn extract_slice_into(frame: &RgbaImage, transform: &MosaicTransform, out: &mut RgbaImage) {
    let projection = slice_projection(frame.dimensions(), transform);
    warp_into(frame, &projection, Interpolation::Bilinear, TRANSPARENT, out);
}

pub fn extract_slice(frame: &RgbaImage, transform: &MosaicTransform) -> RgbaImage {
    let mut out = RgbaImage::new(transform.crop_width, transform.crop_height);
    extract_slice_into(frame, transform, &mut out);
    out
}
