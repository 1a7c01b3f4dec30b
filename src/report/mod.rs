use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::compositor::{CompositeImage, CompositeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageKind {
    Photo,
    Mosaic,
    Kymogram,
}

impl From<CompositeKind> for ImageKind {
    fn from(kind: CompositeKind) -> Self {
        match kind {
            CompositeKind::TileGrid => ImageKind::Mosaic,
            CompositeKind::Kymogram => ImageKind::Kymogram,
        }
    }
}

/// One entry of the examination report.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub id: String,
    pub image: RgbaImage,
    pub captured_at: DateTime<Utc>,
    pub kind: ImageKind,
    /// Share of the report page width the image occupies
    pub display_width_pct: u8,
    /// Pre-enhancement pixels, kept so an enhancement can be undone
    pub original: Option<RgbaImage>,
    pub ai_enhanced: bool,
}

impl CapturedImage {
    pub fn photo(image: RgbaImage, display_width_pct: u8) -> Self {
        Self::new(image, ImageKind::Photo, display_width_pct.clamp(1, 100))
    }

    /// Composites always span the full report width.
    pub fn composite(composite: CompositeImage) -> Self {
        Self::new(composite.image, composite.kind.into(), 100)
    }

    fn new(image: RgbaImage, kind: ImageKind, display_width_pct: u8) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            image,
            captured_at: Utc::now(),
            kind,
            display_width_pct,
            original: None,
            ai_enhanced: false,
        }
    }
}

/// Opaque image-improvement collaborator (remote model, local filter, ...).
pub trait Enhancer: Send + Sync {
    fn enhance(&self, image: &RgbaImage) -> Result<RgbaImage>;
}

/// Ordered list of images the operator has added to the report.
#[derive(Debug, Default)]
pub struct ReportImages {
    images: Vec<CapturedImage>,
}

impl ReportImages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends at the end and returns the new entry's id.
    pub fn append(&mut self, image: CapturedImage) -> String {
        let id = image.id.clone();
        self.images.push(image);
        id
    }

    pub fn get(&self, id: &str) -> Option<&CapturedImage> {
        self.images.iter().find(|image| image.id == id)
    }

    pub fn remove(&mut self, id: &str) -> Option<CapturedImage> {
        let index = self.images.iter().position(|image| image.id == id)?;
        Some(self.images.remove(index))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CapturedImage> {
        self.images.iter()
    }

    /// Replaces the image with an enhanced version. Re-enhancing starts from
    /// the untouched original, so effects never stack.
    pub fn enhance(&mut self, id: &str, enhancer: &dyn Enhancer) -> Result<()> {
        let entry = self.entry_mut(id)?;
        let source = entry.original.as_ref().unwrap_or(&entry.image);
        let enhanced = enhancer
            .enhance(source)
            .with_context(|| format!("enhancement of report image {id} failed"))?;

        if entry.original.is_none() {
            entry.original = Some(std::mem::replace(&mut entry.image, enhanced));
        } else {
            entry.image = enhanced;
        }
        entry.ai_enhanced = true;
        Ok(())
    }

    /// Restores the pre-enhancement pixels. Returns false when there was
    /// nothing to undo.
    pub fn revert_enhancement(&mut self, id: &str) -> Result<bool> {
        let entry = self.entry_mut(id)?;
        match entry.original.take() {
            Some(original) => {
                entry.image = original;
                entry.ai_enhanced = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn entry_mut(&mut self, id: &str) -> Result<&mut CapturedImage> {
        self.images
            .iter_mut()
            .find(|image| image.id == id)
            .ok_or_else(|| anyhow!("no report image with id {id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    struct Invert;

    impl Enhancer for Invert {
        fn enhance(&self, image: &RgbaImage) -> Result<RgbaImage> {
            let mut out = image.clone();
            image::imageops::invert(&mut out);
            Ok(out)
        }
    }

    struct Offline;

    impl Enhancer for Offline {
        fn enhance(&self, _image: &RgbaImage) -> Result<RgbaImage> {
            Err(anyhow!("service unreachable"))
        }
    }

    fn gray(level: u8) -> RgbaImage {
        RgbaImage::from_pixel(4, 4, Rgba([level, level, level, 255]))
    }

    #[test]
    fn append_keeps_order_and_ids() {
        let mut report = ReportImages::new();
        let first = report.append(CapturedImage::photo(gray(10), 25));
        let second = report.append(CapturedImage::photo(gray(20), 25));

        assert_ne!(first, second);
        let ids: Vec<&str> = report.iter().map(|image| image.id.as_str()).collect();
        assert_eq!(ids, [first.as_str(), second.as_str()]);

        assert!(report.remove(&first).is_some());
        assert!(report.get(&first).is_none());
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn composites_span_full_width() {
        let mosaic = CapturedImage::composite(CompositeImage {
            image: gray(0),
            kind: CompositeKind::TileGrid,
        });
        let kymogram = CapturedImage::composite(CompositeImage {
            image: gray(0),
            kind: CompositeKind::Kymogram,
        });
        assert_eq!(mosaic.kind, ImageKind::Mosaic);
        assert_eq!(kymogram.kind, ImageKind::Kymogram);
        assert_eq!(mosaic.display_width_pct, 100);
    }

    #[test]
    fn enhance_and_revert() {
        let mut report = ReportImages::new();
        let id = report.append(CapturedImage::photo(gray(10), 50));

        report.enhance(&id, &Invert).unwrap();
        let entry = report.get(&id).unwrap();
        assert!(entry.ai_enhanced);
        assert_eq!(entry.image.get_pixel(0, 0).0[0], 245);

        // enhancing twice does not invert back
        report.enhance(&id, &Invert).unwrap();
        assert_eq!(report.get(&id).unwrap().image.get_pixel(0, 0).0[0], 245);

        assert!(report.revert_enhancement(&id).unwrap());
        let entry = report.get(&id).unwrap();
        assert!(!entry.ai_enhanced);
        assert_eq!(entry.image.get_pixel(0, 0).0[0], 10);
        assert!(!report.revert_enhancement(&id).unwrap());
    }

    #[test]
    fn failed_enhancement_leaves_image_alone() {
        let mut report = ReportImages::new();
        let id = report.append(CapturedImage::photo(gray(10), 50));
        assert!(report.enhance(&id, &Offline).is_err());
        let entry = report.get(&id).unwrap();
        assert!(!entry.ai_enhanced);
        assert!(entry.original.is_none());
    }

    #[test]
    fn unknown_id_is_an_error() {
        let mut report = ReportImages::new();
        assert!(report.enhance("nope", &Invert).is_err());
        assert!(report.revert_enhancement("nope").is_err());
    }
}
