use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::{
    burst::{DEFAULT_JPEG_QUALITY, DEFAULT_REFRESH_HZ, MAX_BURST_FPS, MIN_BURST_FPS},
    compositor::CompositorConfig,
    detection::DetectorConfig,
    error::{CaptureError, CaptureResult},
};

pub const DEFAULT_BURST_SPEED: u32 = 15;
pub const DEFAULT_GRID_COLUMNS: u32 = 4;

/// Station preferences persisted between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CaptureSettings {
    /// Burst sampling rate in frames per second
    pub burst_speed: u32,
    /// Whether the capture mask starts active
    pub auto_crop_enabled: bool,
    pub photos_grid_columns: u32,
    pub detector: DetectorConfig,
    pub compositor: CompositorConfig,
    pub jpeg_quality: u8,
    pub refresh_hz: u32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            burst_speed: DEFAULT_BURST_SPEED,
            auto_crop_enabled: true,
            photos_grid_columns: DEFAULT_GRID_COLUMNS,
            detector: DetectorConfig::default(),
            compositor: CompositorConfig::default(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            refresh_hz: DEFAULT_REFRESH_HZ,
        }
    }
}

impl CaptureSettings {
    /// Pulls hand-edited values back into their supported ranges.
    fn sanitized(mut self) -> Self {
        self.burst_speed = self.burst_speed.clamp(MIN_BURST_FPS, MAX_BURST_FPS);
        self.photos_grid_columns = self.photos_grid_columns.max(1);
        self.jpeg_quality = self.jpeg_quality.clamp(1, 100);
        self.refresh_hz = self.refresh_hz.max(1);
        self.detector.stride = self.detector.stride.max(1);
        self
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<CaptureSettings>,
}

impl SettingsStore {
    /// Loads settings from `path`. A missing or unreadable file yields
    /// defaults; nothing is written until the first update.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            match serde_json::from_str::<CaptureSettings>(&contents) {
                Ok(settings) => settings.sanitized(),
                Err(err) => {
                    log::warn!(
                        "Ignoring corrupt settings file {}: {err}",
                        path.display()
                    );
                    CaptureSettings::default()
                }
            }
        } else {
            CaptureSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> CaptureSettings {
        self.read().clone()
    }

    pub fn burst_speed(&self) -> u32 {
        self.read().burst_speed
    }

    pub fn set_burst_speed(&self, fps: u32) -> CaptureResult<()> {
        if !(MIN_BURST_FPS..=MAX_BURST_FPS).contains(&fps) {
            return Err(CaptureError::InvalidFrameRate(fps));
        }
        self.modify(|settings| settings.burst_speed = fps)?;
        Ok(())
    }

    pub fn set_auto_crop_enabled(&self, enabled: bool) -> Result<()> {
        self.modify(|settings| settings.auto_crop_enabled = enabled)
    }

    pub fn set_photos_grid_columns(&self, columns: u32) -> Result<()> {
        self.modify(|settings| settings.photos_grid_columns = columns.max(1))
    }

    pub fn update(&self, settings: CaptureSettings) -> Result<()> {
        self.modify(|current| *current = settings.sanitized())
    }

    fn modify(&self, apply: impl FnOnce(&mut CaptureSettings)) -> Result<()> {
        let mut guard = self.write();
        apply(&mut guard);
        self.persist(&guard)
    }

    fn persist(&self, data: &CaptureSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory {}", parent.display())
            })?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, CaptureSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, CaptureSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> SettingsStore {
        SettingsStore::new(dir.path().join("settings.json")).unwrap()
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let settings = store.settings();
        assert_eq!(settings.burst_speed, 15);
        assert!(settings.auto_crop_enabled);
        assert_eq!(settings.photos_grid_columns, 4);
        assert!(!store.path().exists());
    }

    #[test]
    fn updates_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = store_in(&dir);
            store.set_burst_speed(30).unwrap();
            store.set_auto_crop_enabled(false).unwrap();
        }
        let reopened = store_in(&dir);
        assert_eq!(reopened.burst_speed(), 30);
        assert!(!reopened.settings().auto_crop_enabled);
    }

    #[test]
    fn out_of_range_speed_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(matches!(
            store.set_burst_speed(0),
            Err(CaptureError::InvalidFrameRate(0))
        ));
        assert!(matches!(
            store.set_burst_speed(61),
            Err(CaptureError::InvalidFrameRate(61))
        ));
        assert_eq!(store.burst_speed(), 15);
    }

    #[test]
    fn bulk_update_is_sanitized_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let wanted = CaptureSettings {
            burst_speed: 90,
            photos_grid_columns: 0,
            jpeg_quality: 70,
            ..CaptureSettings::default()
        };
        store.update(wanted).unwrap();

        let reopened = store_in(&dir).settings();
        assert_eq!(reopened.burst_speed, 60);
        assert_eq!(reopened.photos_grid_columns, 1);
        assert_eq!(reopened.jpeg_quality, 70);
    }

    #[test]
    fn grid_columns_never_drop_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.set_photos_grid_columns(0).unwrap();
        assert_eq!(store.settings().photos_grid_columns, 1);
        store.set_photos_grid_columns(3).unwrap();
        assert_eq!(store_in(&dir).settings().photos_grid_columns, 3);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("settings.json"), "{ not json").unwrap();
        assert_eq!(store_in(&dir).settings(), CaptureSettings::default());
    }

    #[test]
    fn partial_file_fills_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("settings.json"),
            r#"{ "burstSpeed": 500, "detector": { "padding": 8 } }"#,
        )
        .unwrap();
        let settings = store_in(&dir).settings();
        assert_eq!(settings.burst_speed, 60);
        assert_eq!(settings.detector.padding, 8);
        assert_eq!(settings.detector.stride, 4);
        assert_eq!(settings.jpeg_quality, 95);
    }
}
