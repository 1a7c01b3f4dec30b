use crate::error::{CaptureError, CaptureResult};

use super::transform::MosaicTransform;

/// Row-major tile placement for the contact-sheet mosaic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: u32,
    pub rows: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub gap_x: u32,
    pub gap_y: u32,
}

impl GridLayout {
    /// Never uses more columns than there are frames.
    pub fn new(frame_count: u32, transform: &MosaicTransform) -> Self {
        let columns = transform.columns.min(frame_count).max(1);
        let rows = frame_count.div_ceil(columns).max(1);
        Self {
            columns,
            rows,
            tile_width: transform.crop_width,
            tile_height: transform.crop_height,
            gap_x: transform.gap_x,
            gap_y: transform.gap_y,
        }
    }

    pub fn canvas_size(&self) -> CaptureResult<(u32, u32)> {
        let width = span(self.columns, self.tile_width, self.gap_x);
        let height = span(self.rows, self.tile_height, self.gap_y);
        match (width, height) {
            (Some(width), Some(height)) => Ok((width, height)),
            _ => Err(CaptureError::InvalidTransform(
                "mosaic canvas would be too large".into(),
            )),
        }
    }

    /// Top-left pixel of tile `index`, filling left-to-right, top-to-bottom.
    pub fn tile_origin(&self, index: u32) -> (u32, u32) {
        let col = index % self.columns;
        let row = index / self.columns;
        (
            col * (self.tile_width + self.gap_x),
            row * (self.tile_height + self.gap_y),
        )
    }
}

fn span(count: u32, tile: u32, gap: u32) -> Option<u32> {
    tile.checked_mul(count)?
        .checked_add(gap.checked_mul(count.saturating_sub(1))?)
}

/// Kymogram canvas: full original frame width, one band per frame.
pub fn kymogram_canvas_size(
    frame_width: u32,
    frame_count: u32,
    crop_height: u32,
) -> CaptureResult<(u32, u32)> {
    let height = crop_height.checked_mul(frame_count).ok_or_else(|| {
        CaptureError::InvalidTransform("kymogram would be too tall".into())
    })?;
    Ok((frame_width.max(1), height))
}
