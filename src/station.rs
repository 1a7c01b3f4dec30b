use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, Context};
use chrono::Local;
use log::{error, info, warn};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{
    burst::{BoxedFrameSource, BurstController, BurstOutcome, SessionHandle},
    codec::{encode_jpeg, encode_png},
    compositor::{compose_session, MosaicTransform},
    db::Database,
    detection::detect,
    error::{CaptureError, CaptureResult},
    mask::{apply_mask, CaptureMask, DragMode, MaskInteraction},
    models::{BurstSession, Frame, MaskShape, Region},
    report::{CapturedImage, Enhancer, ReportImages},
    settings::SettingsStore,
    storage::{
        naming::{burst_folder_name, composite_file_name, photo_file_name},
        FsStorage, Storage,
    },
};

const DEFAULT_FRAME_SIZE: (u32, u32) = (1920, 1080);
const HISTORY_DB_FILE: &str = "burst_history.db";
const SETTINGS_FILE: &str = "settings.json";

struct MaskState {
    mask: CaptureMask,
    interaction: MaskInteraction,
}

impl MaskState {
    fn fit_to(&mut self, frame: &Frame) {
        if self.mask.frame_size() != frame.dimensions() {
            self.mask.set_frame_size(frame.width(), frame.height());
        }
    }
}

/// The capture workstation: one subject, one mask, one report, one burst at
/// a time. Cheap to clone; clones share everything.
#[derive(Clone)]
pub struct CaptureStation {
    storage: Arc<dyn Storage>,
    db: Database,
    settings: Arc<SettingsStore>,
    subject: Arc<Mutex<String>>,
    mask: Arc<Mutex<MaskState>>,
    report: Arc<Mutex<ReportImages>>,
    burst: Arc<Mutex<BurstController>>,
}

impl CaptureStation {
    pub fn new(storage: Arc<dyn Storage>, db: Database, settings: SettingsStore) -> Self {
        let prefs = settings.settings();
        let (frame_width, frame_height) = DEFAULT_FRAME_SIZE;

        Self {
            burst: Arc::new(Mutex::new(BurstController::new(
                Arc::clone(&storage),
                prefs.jpeg_quality,
                prefs.refresh_hz,
            ))),
            storage,
            db,
            settings: Arc::new(settings),
            subject: Arc::new(Mutex::new(String::new())),
            mask: Arc::new(Mutex::new(MaskState {
                mask: CaptureMask::new(frame_width, frame_height, prefs.auto_crop_enabled),
                interaction: MaskInteraction::new(),
            })),
            report: Arc::new(Mutex::new(ReportImages::new())),
        }
    }

    /// Captures land under `captures_dir`; history and settings under
    /// `data_dir`.
    pub fn open(data_dir: &Path, captures_dir: PathBuf) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&captures_dir).with_context(|| {
            format!("failed to create capture directory {}", captures_dir.display())
        })?;
        let db = Database::new(data_dir.join(HISTORY_DB_FILE))?;
        let settings = SettingsStore::new(data_dir.join(SETTINGS_FILE))?;
        info!("Capture station storing frames in {}", captures_dir.display());
        Ok(Self::new(Arc::new(FsStorage::new(captures_dir)), db, settings))
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub async fn set_subject(&self, subject: &str) {
        *self.subject.lock().await = subject.to_string();
    }

    pub async fn subject(&self) -> String {
        self.subject.lock().await.clone()
    }

    /// Looks for the lit fiber bundle and, when found, snaps the mask to it.
    pub async fn auto_detect(&self, frame: &Frame) -> Option<Region> {
        let config = self.settings.settings().detector;
        let mut state = self.mask.lock().await;
        state.fit_to(frame);
        let region = detect(frame, &config)?;
        state.mask.set_from_region(region);
        info!(
            "Mask snapped to {}x{} {} at ({}, {})",
            region.width,
            region.height,
            region.shape.as_str(),
            region.x,
            region.y
        );
        Some(region)
    }

    /// Tells the mask the camera's native resolution, e.g. when the stream
    /// opens or changes mode. Drag deltas are scaled against it.
    pub async fn set_camera_resolution(&self, width: u32, height: u32) {
        let mut state = self.mask.lock().await;
        if state.mask.frame_size() != (width, height) {
            state.mask.set_frame_size(width, height);
        }
    }

    pub async fn mask(&self) -> CaptureMask {
        self.mask.lock().await.mask
    }

    pub async fn mask_pointer_down(&self, point: (f64, f64), mode: DragMode) {
        self.mask.lock().await.interaction.pointer_down(point, mode);
    }

    /// Returns true when the mask moved or resized.
    pub async fn mask_pointer_move(&self, point: (f64, f64), display_size: (f64, f64)) -> bool {
        let mut guard = self.mask.lock().await;
        let MaskState { mask, interaction } = &mut *guard;
        interaction.pointer_move(point, display_size, mask)
    }

    pub async fn mask_pointer_up(&self) {
        self.mask.lock().await.interaction.pointer_up();
    }

    pub async fn toggle_mask_shape(&self) -> MaskShape {
        let mut state = self.mask.lock().await;
        state.mask.toggle_shape();
        state.mask.shape()
    }

    /// Switches the mask on or off and remembers the choice.
    pub async fn set_mask_active(&self, active: bool) -> anyhow::Result<()> {
        self.mask.lock().await.mask.set_active(active);
        self.settings.set_auto_crop_enabled(active)
    }

    /// Crops `frame` with the current mask and adds it to the report.
    ///
    /// The unmasked frame is also saved as a backup; a failed backup is
    /// logged and does not stop the photo.
    pub async fn take_photo(&self, frame: Frame) -> CaptureResult<String> {
        let masked = {
            let mut state = self.mask.lock().await;
            state.fit_to(&frame);
            apply_mask(&frame, &state.mask)
        };

        let prefs = self.settings.settings();
        let quality = prefs.jpeg_quality;
        let file_name = photo_file_name(&Local::now(), &self.subject().await);
        let storage = Arc::clone(&self.storage);
        let backup = tokio::task::spawn_blocking(move || {
            encode_jpeg(frame.image(), quality)
                .and_then(|bytes| storage.write(Path::new(&file_name), &bytes))
                .map(|_| file_name)
        })
        .await
        .map_err(|err| anyhow!("photo backup task failed: {err}"))?;

        match backup {
            Ok(file_name) => info!("Saved photo backup {file_name}"),
            Err(err) => warn!("Photo backup skipped: {err:#}"),
        }

        let width_pct = (100 / prefs.photos_grid_columns.max(1)).clamp(1, 100) as u8;
        let id = self
            .report
            .lock()
            .await
            .append(CapturedImage::photo(masked, width_pct));
        Ok(id)
    }

    /// Starts a burst at the configured speed into a fresh folder.
    ///
    /// On failure the camera is handed back with the error.
    pub async fn start_burst(
        &self,
        source: BoxedFrameSource,
    ) -> Result<SessionHandle, (CaptureError, BoxedFrameSource)> {
        let subject = self.subject().await;
        let folder_name = burst_folder_name(&Local::now(), &subject);
        let fps = self.settings.burst_speed();

        let mut burst = self.burst.lock().await;
        let prefs = self.settings.settings();
        if !burst.is_running() {
            burst.set_jpeg_quality(prefs.jpeg_quality);
            burst.set_refresh_hz(prefs.refresh_hz);
        }
        burst.start_burst(source, fps, &folder_name, &subject)
    }

    pub async fn is_bursting(&self) -> bool {
        self.burst.lock().await.is_running()
    }

    pub async fn live_frame_count(&self) -> u32 {
        self.burst.lock().await.live_frame_count()
    }

    /// Ends the running burst. Only bursts that saved frames enter the
    /// history.
    pub async fn stop_burst(&self) -> CaptureResult<(BurstOutcome, BoxedFrameSource)> {
        let (outcome, source) = self.burst.lock().await.stop_burst().await?;

        match &outcome {
            BurstOutcome::Completed(session) => {
                info!(
                    "Burst {} kept {} frames over {} ms",
                    session.id,
                    session.frame_count,
                    session.duration_ms()
                );
                if let Err(err) = self.db.insert_burst_session(session).await {
                    error!("Failed to record burst {} in history: {err:#}", session.id);
                }
            }
            BurstOutcome::Discarded { folder_name } => {
                warn!("Burst into {folder_name} saved no frames; not added to history");
            }
        }

        Ok((outcome, source))
    }

    pub async fn burst_history(&self) -> CaptureResult<Vec<BurstSession>> {
        Ok(self.db.list_burst_sessions().await?)
    }

    pub async fn clear_burst_history(&self) -> CaptureResult<usize> {
        Ok(self.db.clear_burst_history().await?)
    }

    /// Bakes a finished burst into a mosaic or kymogram and adds it to the
    /// report. Returns the new report entry's id.
    pub async fn compose_burst(
        &self,
        session_id: &str,
        transform: MosaicTransform,
        cancel: CancellationToken,
    ) -> CaptureResult<String> {
        let session = self
            .db
            .get_burst_session(session_id)
            .await?
            .ok_or_else(|| CaptureError::UnknownSession(session_id.to_string()))?;

        let config = self.settings.settings().compositor;
        let storage = Arc::clone(&self.storage);
        let folder = PathBuf::from(&session.folder_name);
        let composite = tokio::task::spawn_blocking(move || {
            compose_session(storage.as_ref(), &folder, &transform, &config, &cancel)
        })
        .await
        .map_err(|err| anyhow!("compositing task failed: {err}"))??;

        let file_name = composite_file_name(&Local::now(), &session.subject);
        let storage = Arc::clone(&self.storage);
        let image = composite.image.clone();
        let saved = tokio::task::spawn_blocking(move || {
            encode_png(&image).and_then(|bytes| storage.write(Path::new(&file_name), &bytes))
        })
        .await;
        match saved {
            Ok(Ok(())) => info!("Saved composite for burst {}", session.id),
            Ok(Err(err)) => warn!("Composite file not saved: {err:#}"),
            Err(err) => warn!("Composite save task failed: {err}"),
        }

        let id = self
            .report
            .lock()
            .await
            .append(CapturedImage::composite(composite));
        Ok(id)
    }

    pub async fn report_len(&self) -> usize {
        self.report.lock().await.len()
    }

    pub async fn report_image(&self, id: &str) -> Option<CapturedImage> {
        self.report.lock().await.get(id).cloned()
    }

    pub async fn remove_report_image(&self, id: &str) -> Option<CapturedImage> {
        self.report.lock().await.remove(id)
    }

    pub async fn enhance_report_image(
        &self,
        id: &str,
        enhancer: &dyn Enhancer,
    ) -> anyhow::Result<()> {
        self.report.lock().await.enhance(id, enhancer)
    }

    pub async fn revert_report_image(&self, id: &str) -> anyhow::Result<bool> {
        self.report.lock().await.revert_enhancement(id)
    }
}
