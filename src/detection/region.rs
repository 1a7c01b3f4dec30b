use crate::detection::config::DetectorConfig;
use crate::models::{Frame, MaskShape, Region};

/// Finds the illuminated part of a vignetted scope frame.
///
/// Endoscope feeds are black outside the fiber bundle, so this only has to
/// find where the black ends: a strided scan for samples brighter than the
/// threshold, a padded bounding box, and an aspect-ratio guess at the shape.
/// Returns `None` when nothing usable was found; callers keep their mask.
pub fn detect(frame: &Frame, config: &DetectorConfig) -> Option<Region> {
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    let stride = config.stride.max(1) as usize;
    let image = frame.image();

    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut lit = false;

    for y in (0..height).step_by(stride) {
        for x in (0..width).step_by(stride) {
            let [r, g, b, _] = image.get_pixel(x, y).0;
            if r.max(g).max(b) > config.brightness_threshold {
                lit = true;
                min_x = min_x.min(x);
                max_x = max_x.max(x);
                min_y = min_y.min(y);
                max_y = max_y.max(y);
            }
        }
    }

    if !lit {
        return None;
    }

    let left = min_x.saturating_sub(config.padding);
    let top = min_y.saturating_sub(config.padding);
    let right = max_x.saturating_add(config.padding).min(width);
    let bottom = max_y.saturating_add(config.padding).min(height);

    let region_width = right - left;
    let region_height = bottom - top;

    if region_width <= config.min_size || region_height <= config.min_size {
        log::debug!(
            "scope area detection inconclusive ({}x{} box), keeping current mask",
            region_width,
            region_height
        );
        return None;
    }

    let ratio = region_width as f64 / region_height as f64;
    let shape = if (config.ellipse_ratio_min..=config.ellipse_ratio_max).contains(&ratio) {
        MaskShape::Ellipse
    } else {
        MaskShape::Rectangle
    };

    Some(Region {
        x: left,
        y: top,
        width: region_width,
        height: region_height,
        shape,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn frame_with_lit_rect(w: u32, h: u32, x0: u32, y0: u32, rw: u32, rh: u32) -> Frame {
        let image = RgbaImage::from_fn(w, h, |x, y| {
            if x >= x0 && x < x0 + rw && y >= y0 && y < y0 + rh {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        Frame::now(image)
    }

    #[test]
    fn all_dark_frame_is_inconclusive() {
        let frame = Frame::now(RgbaImage::from_pixel(320, 240, Rgba([10, 20, 25, 255])));
        assert_eq!(detect(&frame, &DetectorConfig::default()), None);
    }

    #[test]
    fn small_lit_spot_is_inconclusive() {
        // 8px spot + 2 * 20px padding stays at or below 50px
        let frame = frame_with_lit_rect(400, 400, 200, 200, 8, 8);
        assert_eq!(detect(&frame, &DetectorConfig::default()), None);
    }

    #[test]
    fn thin_lit_strip_is_inconclusive() {
        let frame = frame_with_lit_rect(400, 400, 40, 200, 300, 4);
        assert_eq!(detect(&frame, &DetectorConfig::default()), None);
    }

    #[test]
    fn square_region_is_ellipse() {
        let frame = frame_with_lit_rect(400, 400, 150, 150, 100, 100);
        let region = detect(&frame, &DetectorConfig::default()).expect("region");

        assert_eq!(region.shape, MaskShape::Ellipse);
        assert!((region.x as i64 - 130).abs() <= 4, "x = {}", region.x);
        assert!((region.y as i64 - 130).abs() <= 4, "y = {}", region.y);
        assert!((region.width as i64 - 140).abs() <= 8, "w = {}", region.width);
        assert!((region.height as i64 - 140).abs() <= 8, "h = {}", region.height);
    }

    #[test]
    fn wide_region_is_rectangle() {
        let frame = frame_with_lit_rect(640, 480, 100, 180, 240, 120);
        let region = detect(&frame, &DetectorConfig::default()).expect("region");

        assert_eq!(region.shape, MaskShape::Rectangle);
        assert!(region.aspect_ratio() > 1.2);
    }

    #[test]
    fn region_touching_border_is_clamped() {
        let frame = frame_with_lit_rect(200, 160, 0, 0, 200, 160);
        let region = detect(&frame, &DetectorConfig::default()).expect("region");

        assert_eq!((region.x, region.y), (0, 0));
        assert_eq!((region.width, region.height), (200, 160));
    }

    #[test]
    fn threshold_is_strict() {
        let config = DetectorConfig::default();
        let frame = Frame::now(RgbaImage::from_pixel(
            200,
            200,
            Rgba([config.brightness_threshold, 0, 0, 255]),
        ));
        assert_eq!(detect(&frame, &config), None);
    }
}
