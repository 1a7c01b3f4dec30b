use std::io::Cursor;

use anyhow::{Context, Result};
use image::{buffer::ConvertBuffer, codecs::jpeg::JpegEncoder, ImageFormat, RgbImage, RgbaImage};

/// Encodes a frame as JPEG. Alpha is dropped; camera frames are opaque.
pub fn encode_jpeg(image: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
    let rgb: RgbImage = image.convert();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
        .encode_image(&rgb)
        .context("jpeg encoding failed")?;
    Ok(bytes)
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .context("png encoding failed")?;
    Ok(cursor.into_inner())
}

/// Decodes any supported raster into RGBA8, guessing the format from content.
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage> {
    let image = image::load_from_memory(bytes).context("unrecognized or corrupt image data")?;
    Ok(image.to_rgba8())
}
