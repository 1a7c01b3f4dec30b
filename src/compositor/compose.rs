use std::{borrow::Cow, path::Path};

use anyhow::anyhow;
use image::{
    imageops::{self, FilterType},
    Rgba, RgbaImage,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::{
    codec::decode_rgba,
    error::{CaptureError, CaptureResult},
    log_debug, log_info,
    models::Frame,
    storage::{
        naming::{is_frame_file, natural_cmp},
        FileEntry, Storage,
    },
};

use super::{
    layout::{kymogram_canvas_size, GridLayout},
    slice::extract_slice_into,
    transform::{CompositorConfig, MosaicTransform},
};

const ENABLE_LOGS: bool = true;
const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeKind {
    TileGrid,
    Kymogram,
}

#[derive(Debug, Clone)]
pub struct CompositeImage {
    pub image: RgbaImage,
    pub kind: CompositeKind,
}

/// Bakes in-memory frames into one image.
pub fn compose(
    frames: &[Frame],
    transform: &MosaicTransform,
    config: &CompositorConfig,
) -> CaptureResult<CompositeImage> {
    compose_with(frames.len(), transform, config, None, |index| {
        Ok(Cow::Borrowed(frames[index].image()))
    })
}

/// Bakes every frame file in a burst folder, in natural name order.
///
/// Frames are decoded one at a time. Any unreadable frame aborts the whole
/// composite; no partial image is returned.
pub fn compose_session(
    storage: &dyn Storage,
    folder: &Path,
    transform: &MosaicTransform,
    config: &CompositorConfig,
    cancel: &CancellationToken,
) -> CaptureResult<CompositeImage> {
    let mut entries: Vec<FileEntry> = storage
        .list(folder)
        .map_err(|err| CaptureError::StorageUnavailable {
            folder: folder.display().to_string(),
            reason: format!("{err:#}"),
        })?
        .into_iter()
        .filter(|entry| is_frame_file(&entry.name))
        .collect();
    entries.sort_by(|a, b| natural_cmp(&a.name, &b.name));

    log_debug!(
        "[compositor] {} frame files in {}",
        entries.len(),
        folder.display()
    );

    compose_with(entries.len(), transform, config, Some(cancel), |index| {
        let entry = &entries[index];
        let load_failure = |err: anyhow::Error| CaptureError::FrameLoadFailure {
            name: entry.name.clone(),
            reason: format!("{err:#}"),
        };
        let bytes = storage.read(&entry.path).map_err(load_failure)?;
        let image = decode_rgba(&bytes).map_err(load_failure)?;
        Ok(Cow::Owned(image))
    })
}

fn compose_with<'a, L>(
    count: usize,
    transform: &MosaicTransform,
    config: &CompositorConfig,
    cancel: Option<&CancellationToken>,
    mut load: L,
) -> CaptureResult<CompositeImage>
where
    L: FnMut(usize) -> CaptureResult<Cow<'a, RgbaImage>>,
{
    if count == 0 {
        return Err(CaptureError::EmptyCompositeInput);
    }
    transform.validate()?;
    let frame_count = u32::try_from(count).map_err(|_| anyhow!("too many frames: {count}"))?;
    let is_cancelled = || cancel.is_some_and(CancellationToken::is_cancelled);
    if is_cancelled() {
        return Err(CaptureError::Cancelled);
    }

    let first = load(0)?;
    let kind = if config.is_kymogram(transform) {
        CompositeKind::Kymogram
    } else {
        CompositeKind::TileGrid
    };
    let grid = GridLayout::new(frame_count, transform);
    let (canvas_width, canvas_height) = match kind {
        CompositeKind::Kymogram => {
            kymogram_canvas_size(first.width(), frame_count, transform.crop_height)?
        }
        CompositeKind::TileGrid => grid.canvas_size()?,
    };

    let mut canvas = RgbaImage::from_pixel(canvas_width, canvas_height, BACKGROUND);
    let mut slice = RgbaImage::new(transform.crop_width, transform.crop_height);
    let mut pending_first = Some(first);

    for index in 0..frame_count {
        if is_cancelled() {
            log_info!("[compositor] cancelled after {index} frames");
            return Err(CaptureError::Cancelled);
        }
        let frame = match pending_first.take() {
            Some(frame) => frame,
            None => load(index as usize)?,
        };
        extract_slice_into(&frame, transform, &mut slice);

        match kind {
            CompositeKind::Kymogram => {
                let band = imageops::resize(
                    &slice,
                    canvas_width,
                    transform.crop_height,
                    FilterType::Nearest,
                );
                let y = i64::from(index) * i64::from(transform.crop_height);
                imageops::overlay(&mut canvas, &band, 0, y);
            }
            CompositeKind::TileGrid => {
                let (x, y) = grid.tile_origin(index);
                imageops::overlay(&mut canvas, &slice, i64::from(x), i64::from(y));
            }
        }
    }

    log_info!(
        "[compositor] baked {} frames into {}x{} {:?}",
        frame_count,
        canvas_width,
        canvas_height,
        kind
    );

    Ok(CompositeImage {
        image: canvas,
        kind,
    })
}
