use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::BurstStatus;

/// Frame names are `IMG_0001` to `IMG_9999`; sampling pauses after the last.
pub const MAX_FRAME_INDEX: u32 = 9999;

/// Bookkeeping for the burst currently owned by a sampler.
///
/// `last_sample_ms` is on the host's render clock, not wall time; only the
/// difference between ticks matters.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BurstState {
    pub status: BurstStatus,
    pub session_id: Option<String>,
    pub folder_name: Option<String>,
    pub subject: String,
    pub target_fps: u32,
    pub started_at: Option<DateTime<Utc>>,
    /// Index the next sampled frame receives; starts at 1.
    pub next_index: u32,
    #[serde(skip)]
    pub last_sample_ms: Option<f64>,
}

impl BurstState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_session(
        &mut self,
        session_id: String,
        folder_name: String,
        subject: String,
        target_fps: u32,
        started_at: DateTime<Utc>,
    ) {
        *self = Self {
            status: BurstStatus::Running,
            session_id: Some(session_id),
            folder_name: Some(folder_name),
            subject,
            target_fps,
            started_at: Some(started_at),
            next_index: 1,
            last_sample_ms: None,
        };
    }

    pub fn sample_interval_ms(&self) -> f64 {
        1000.0 / self.target_fps.max(1) as f64
    }

    /// True when the render clock has advanced at least one sampling interval
    /// since the previous sample (or nothing has been sampled yet).
    pub fn is_due(&self, now_ms: f64) -> bool {
        if self.status != BurstStatus::Running || self.is_full() {
            return false;
        }
        match self.last_sample_ms {
            None => true,
            Some(last) => now_ms - last >= self.sample_interval_ms(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.next_index > MAX_FRAME_INDEX
    }

    /// Claims the next frame index for a sample taken at `now_ms`.
    pub fn record_sample(&mut self, now_ms: f64) -> u32 {
        let index = self.next_index;
        self.next_index = self.next_index.saturating_add(1);
        self.last_sample_ms = Some(now_ms);
        index
    }

    pub fn stop(&mut self) {
        self.status = BurstStatus::Stopped;
        self.last_sample_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_is_always_due() {
        let mut state = BurstState::new();
        assert!(!state.is_due(0.0));

        state.begin_session("s".into(), "f".into(), "Ana".into(), 10, Utc::now());
        assert!(state.is_due(12_345.0));
    }

    #[test]
    fn interval_gates_samples() {
        let mut state = BurstState::new();
        state.begin_session("s".into(), "f".into(), "Ana".into(), 20, Utc::now());

        assert_eq!(state.record_sample(1_000.0), 1);
        assert!(!state.is_due(1_049.9));
        assert!(state.is_due(1_050.0));
        assert_eq!(state.record_sample(1_050.0), 2);
    }

    #[test]
    fn sampling_pauses_after_last_frame_name() {
        let mut state = BurstState::new();
        state.begin_session("s".into(), "f".into(), "Ana".into(), 60, Utc::now());
        state.next_index = MAX_FRAME_INDEX;

        assert!(state.is_due(0.0));
        assert_eq!(state.record_sample(0.0), MAX_FRAME_INDEX);
        assert!(state.is_full());
        assert!(!state.is_due(60_000.0));
    }

    #[test]
    fn stopped_state_never_samples() {
        let mut state = BurstState::new();
        state.begin_session("s".into(), "f".into(), "Ana".into(), 60, Utc::now());
        state.stop();
        assert!(!state.is_due(f64::MAX));
        assert_eq!(state.status, BurstStatus::Stopped);
    }
}
