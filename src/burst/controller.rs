use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use anyhow::{anyhow, Context};
use log::{error, info};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    error::{CaptureError, CaptureResult},
    storage::Storage,
};

use super::{
    loop_worker::{burst_loop, BoxedFrameSource},
    sampler::{BurstOutcome, BurstSampler, SessionHandle},
};

pub const DEFAULT_REFRESH_HZ: u32 = 60;

/// Owns the burst sampler and, while a burst runs, the task driving it.
pub struct BurstController {
    storage: Arc<dyn Storage>,
    jpeg_quality: u8,
    refresh_hz: u32,
    sampler: Option<BurstSampler>,
    handle: Option<JoinHandle<(BurstSampler, BoxedFrameSource)>>,
    cancel_token: Option<CancellationToken>,
    session: Option<SessionHandle>,
    live_count: Option<Arc<AtomicU32>>,
}

impl BurstController {
    pub fn new(storage: Arc<dyn Storage>, jpeg_quality: u8, refresh_hz: u32) -> Self {
        Self {
            sampler: Some(BurstSampler::new(Arc::clone(&storage), jpeg_quality)),
            storage,
            jpeg_quality,
            refresh_hz,
            handle: None,
            cancel_token: None,
            session: None,
            live_count: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn session(&self) -> Option<&SessionHandle> {
        self.session.as_ref()
    }

    /// Frames persisted so far by the running burst.
    pub fn live_frame_count(&self) -> u32 {
        self.live_count
            .as_ref()
            .map(|count| count.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn set_jpeg_quality(&mut self, jpeg_quality: u8) {
        self.jpeg_quality = jpeg_quality;
        if !self.is_running() {
            self.sampler = Some(BurstSampler::new(Arc::clone(&self.storage), jpeg_quality));
        }
    }

    pub fn set_refresh_hz(&mut self, refresh_hz: u32) {
        self.refresh_hz = refresh_hz;
    }

    /// Opens a burst and starts sampling `source`.
    ///
    /// The source is returned on failure so the caller keeps its camera.
    pub fn start_burst(
        &mut self,
        source: BoxedFrameSource,
        target_fps: u32,
        folder_name: &str,
        subject: &str,
    ) -> Result<SessionHandle, (CaptureError, BoxedFrameSource)> {
        if self.is_running() {
            return Err((CaptureError::BurstAlreadyRunning, source));
        }

        let mut sampler = self
            .sampler
            .take()
            .unwrap_or_else(|| BurstSampler::new(Arc::clone(&self.storage), self.jpeg_quality));

        let session = match sampler.start(target_fps, folder_name, subject) {
            Ok(session) => session,
            Err(err) => {
                self.sampler = Some(sampler);
                return Err((err, source));
            }
        };

        let cancel_token = CancellationToken::new();
        self.live_count = Some(sampler.frame_counter());
        self.handle = Some(tokio::spawn(burst_loop(
            sampler,
            source,
            self.refresh_hz,
            cancel_token.clone(),
        )));
        self.cancel_token = Some(cancel_token);
        self.session = Some(session.clone());

        info!("burst controller running session {}", session.id());
        Ok(session)
    }

    /// Stops sampling, finalizes the session and returns the camera.
    pub async fn stop_burst(&mut self) -> CaptureResult<(BurstOutcome, BoxedFrameSource)> {
        let (Some(handle), Some(session)) = (self.handle.take(), self.session.take()) else {
            return Err(CaptureError::BurstNotRunning);
        };

        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        self.live_count = None;

        let (mut sampler, source) = match handle.await.context("burst loop task failed to join") {
            Ok(parts) => parts,
            Err(err) => {
                error!("{err:#}");
                self.sampler = Some(BurstSampler::new(Arc::clone(&self.storage), self.jpeg_quality));
                return Err(CaptureError::Other(anyhow!(
                    "burst {} aborted: {err:#}",
                    session.id()
                )));
            }
        };

        let outcome = sampler.stop(&session).await;
        self.sampler = Some(sampler);
        Ok((outcome?, source))
    }
}
