use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
};

use anyhow::anyhow;
use chrono::Utc;
use tokio::{runtime::Handle, task::JoinHandle};
use uuid::Uuid;

use crate::{
    codec::encode_jpeg,
    error::{CaptureError, CaptureResult},
    models::{BurstSession, BurstStatus, Frame, FrameSource},
    storage::{naming::burst_frame_name, Storage},
};

use super::state::BurstState;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

pub const MIN_BURST_FPS: u32 = 1;
pub const MAX_BURST_FPS: u32 = 60;
pub const DEFAULT_JPEG_QUALITY: u8 = 95;
const FRAME_EXTENSION: &str = "jpg";

/// Opaque ticket for the running burst; required to stop it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    id: String,
    folder_name: String,
}

impl SessionHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn folder_name(&self) -> &str {
        &self.folder_name
    }
}

/// How a burst ended.
#[derive(Debug, Clone, PartialEq)]
pub enum BurstOutcome {
    Completed(BurstSession),
    /// Nothing was persisted; the session never reaches history.
    Discarded { folder_name: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRecord {
    pub index: u32,
    pub sampled_at_ms: f64,
}

/// Samples raw frames at a fixed rate into one numbered folder.
///
/// The host's render clock drives [`BurstSampler::tick`]. Grabbing the frame
/// is synchronous; encoding and writing it run as blocking tasks whose only
/// effect on the sampler is the persisted-frame counter, so a slow disk never
/// slows the sampling cadence.
pub struct BurstSampler {
    storage: Arc<dyn Storage>,
    jpeg_quality: u8,
    state: BurstState,
    persisted: Arc<AtomicU32>,
    pending: Vec<JoinHandle<()>>,
    samples: Vec<SampleRecord>,
    runtime: Option<Handle>,
}

impl BurstSampler {
    pub fn new(storage: Arc<dyn Storage>, jpeg_quality: u8) -> Self {
        Self {
            storage,
            jpeg_quality,
            state: BurstState::new(),
            persisted: Arc::new(AtomicU32::new(0)),
            pending: Vec::new(),
            samples: Vec::new(),
            runtime: None,
        }
    }

    pub fn status(&self) -> BurstStatus {
        self.state.status
    }

    pub fn state(&self) -> &BurstState {
        &self.state
    }

    /// Frames persisted so far in the current (or last) burst.
    pub fn frame_count(&self) -> u32 {
        self.persisted.load(Ordering::SeqCst)
    }

    /// Shared view of the persisted-frame counter for live progress display.
    pub fn frame_counter(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.persisted)
    }

    pub fn samples(&self) -> &[SampleRecord] {
        &self.samples
    }

    /// Validates the destination and opens a new burst.
    ///
    /// Everything that would make the whole burst useless (bad rate, folder
    /// that cannot be written, no async runtime) is rejected here, before a
    /// handle exists.
    pub fn start(
        &mut self,
        target_fps: u32,
        folder_name: &str,
        subject: &str,
    ) -> CaptureResult<SessionHandle> {
        if self.state.status == BurstStatus::Running {
            return Err(CaptureError::BurstAlreadyRunning);
        }
        if !(MIN_BURST_FPS..=MAX_BURST_FPS).contains(&target_fps) {
            return Err(CaptureError::InvalidFrameRate(target_fps));
        }

        let runtime = Handle::try_current()
            .map_err(|err| anyhow!("burst sampling requires a tokio runtime: {err}"))?;

        self.storage
            .ensure_writable(Path::new(folder_name))
            .map_err(|err| CaptureError::StorageUnavailable {
                folder: folder_name.to_string(),
                reason: format!("{err:#}"),
            })?;

        let session_id = Uuid::new_v4().to_string();
        self.state.begin_session(
            session_id.clone(),
            folder_name.to_string(),
            subject.to_string(),
            target_fps,
            Utc::now(),
        );
        self.persisted = Arc::new(AtomicU32::new(0));
        self.pending.clear();
        self.samples.clear();
        self.runtime = Some(runtime);

        log_info!(
            "burst {} started at {} fps into {}",
            session_id,
            target_fps,
            folder_name
        );

        Ok(SessionHandle {
            id: session_id,
            folder_name: folder_name.to_string(),
        })
    }

    /// One render-clock callback. Returns the index of the frame sampled on
    /// this tick, if any.
    pub fn tick(&mut self, now_ms: f64, source: &mut dyn FrameSource) -> Option<u32> {
        if !self.state.is_due(now_ms) {
            return None;
        }

        // No frame ready: leave the slot open for the next tick.
        let frame = source.next_frame()?;
        let index = self.state.record_sample(now_ms);
        if self.state.is_full() {
            log_warn!(
                "burst reached frame {}; no further frames are sampled until stop",
                index
            );
        }
        self.samples.push(SampleRecord {
            index,
            sampled_at_ms: now_ms,
        });

        self.pending.retain(|task| !task.is_finished());
        self.persist(index, frame);
        Some(index)
    }

    fn persist(&mut self, index: u32, frame: Frame) {
        let (Some(runtime), Some(folder)) = (&self.runtime, &self.state.folder_name) else {
            return;
        };

        let path = PathBuf::from(folder).join(burst_frame_name(index, FRAME_EXTENSION));
        let storage = Arc::clone(&self.storage);
        let counter = Arc::clone(&self.persisted);
        let quality = self.jpeg_quality;

        let task = runtime.spawn_blocking(move || {
            let result = encode_jpeg(frame.image(), quality)
                .and_then(|bytes| storage.write(&path, &bytes));
            match result {
                Ok(()) => {
                    counter.fetch_add(1, Ordering::SeqCst);
                    log_debug!("persisted burst frame {}", path.display());
                }
                Err(err) => {
                    log_warn!("dropping burst frame {}: {err:#}", path.display());
                }
            }
        });
        self.pending.push(task);
    }

    /// Closes the burst, waiting for in-flight writes so the count is final.
    pub async fn stop(&mut self, handle: &SessionHandle) -> CaptureResult<BurstOutcome> {
        if self.state.status != BurstStatus::Running {
            return Err(CaptureError::BurstNotRunning);
        }
        if self.state.session_id.as_deref() != Some(handle.id()) {
            return Err(CaptureError::UnknownSession(handle.id().to_string()));
        }

        self.state.stop();

        for task in self.pending.drain(..) {
            if let Err(err) = task.await {
                log_error!("burst frame writer failed to join: {err}");
            }
        }
        self.runtime = None;

        let frame_count = self.persisted.load(Ordering::SeqCst);
        let folder_name = handle.folder_name().to_string();

        if frame_count == 0 {
            log_warn!(
                "burst {} ended with 0 frames saved (check folder permissions); discarding",
                handle.id()
            );
            return Ok(BurstOutcome::Discarded { folder_name });
        }

        let session = BurstSession {
            id: handle.id().to_string(),
            folder_name,
            subject: self.state.subject.clone(),
            started_at: self.state.started_at.unwrap_or_else(Utc::now),
            stopped_at: Utc::now(),
            frame_count,
        };

        log_info!(
            "burst {} finished: {} of {} sampled frames saved",
            session.id,
            frame_count,
            self.samples.len()
        );

        Ok(BurstOutcome::Completed(session))
    }
}
