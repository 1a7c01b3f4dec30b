use image::{imageops, Rgba, RgbaImage};

use super::CaptureMask;
use crate::models::{Frame, MaskShape};

/// Cuts the masked sub-image out of a frame for single-photo capture.
///
/// The destination is `mask.width x mask.height`; the frame is drawn offset by
/// the mask origin and, for an ellipse mask, everything outside the ellipse
/// inscribed in the destination is left transparent. An inactive mask keeps
/// the whole frame.
pub fn apply_mask(frame: &Frame, mask: &CaptureMask) -> RgbaImage {
    if !mask.is_active() {
        return frame.image().clone();
    }

    let (x, y, width, height) = mask.pixel_rect();
    let mut out = RgbaImage::new(width, height);
    imageops::replace(&mut out, frame.image(), -(x as i64), -(y as i64));

    if mask.shape() == MaskShape::Ellipse {
        clip_to_ellipse(&mut out);
    }

    out
}

fn clip_to_ellipse(image: &mut RgbaImage) {
    let (width, height) = image.dimensions();
    let rx = width as f64 / 2.0;
    let ry = height as f64 / 2.0;

    for (px, py, pixel) in image.enumerate_pixels_mut() {
        let nx = (px as f64 + 0.5 - rx) / rx;
        let ny = (py as f64 + 0.5 - ry) / ry;
        if nx * nx + ny * ny > 1.0 {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Region;

    fn gradient_frame(w: u32, h: u32) -> Frame {
        Frame::now(RgbaImage::from_fn(w, h, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        }))
    }

    fn mask_at(frame: &Frame, x: u32, y: u32, w: u32, h: u32, shape: MaskShape) -> CaptureMask {
        let mut mask = CaptureMask::new(frame.width(), frame.height(), false);
        mask.set_from_region(Region {
            x,
            y,
            width: w,
            height: h,
            shape,
        });
        mask
    }

    #[test]
    fn rectangle_mask_crops_at_offset() {
        let frame = gradient_frame(300, 200);
        let mask = mask_at(&frame, 40, 30, 100, 80, MaskShape::Rectangle);

        let out = apply_mask(&frame, &mask);

        assert_eq!(out.dimensions(), (100, 80));
        assert_eq!(out.get_pixel(0, 0), frame.image().get_pixel(40, 30));
        assert_eq!(out.get_pixel(99, 79), frame.image().get_pixel(139, 109));
    }

    #[test]
    fn ellipse_mask_clears_corners() {
        let frame = gradient_frame(300, 200);
        let mask = mask_at(&frame, 50, 50, 120, 80, MaskShape::Ellipse);

        let out = apply_mask(&frame, &mask);

        assert_eq!(out.get_pixel(0, 0).0[3], 0);
        assert_eq!(out.get_pixel(119, 79).0[3], 0);
        assert_eq!(out.get_pixel(60, 40), frame.image().get_pixel(110, 90));
        // edge midpoints sit inside the inscribed ellipse
        assert_eq!(out.get_pixel(0, 40).0[3], 255);
        assert_eq!(out.get_pixel(60, 0).0[3], 255);
    }

    #[test]
    fn inactive_mask_keeps_full_frame() {
        let frame = gradient_frame(120, 90);
        let mut mask = mask_at(&frame, 10, 10, 60, 60, MaskShape::Ellipse);
        mask.set_active(false);

        let out = apply_mask(&frame, &mask);
        assert_eq!(&out, frame.image());
    }
}
