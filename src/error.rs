use thiserror::Error;

/// Failures surfaced to the host by the capture pipeline.
///
/// Per-frame problems inside a running burst never show up here; they are
/// logged and skipped by the sampler.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no frames to compose")]
    EmptyCompositeInput,

    #[error("failed to load frame {name}: {reason}")]
    FrameLoadFailure { name: String, reason: String },

    #[error("storage unavailable at '{folder}': {reason}")]
    StorageUnavailable { folder: String, reason: String },

    #[error("invalid mosaic transform: {0}")]
    InvalidTransform(String),

    #[error("burst speed {0} fps is outside 1-60")]
    InvalidFrameRate(u32),

    #[error("a burst is already running")]
    BurstAlreadyRunning,

    #[error("no burst is running")]
    BurstNotRunning,

    #[error("unknown burst session {0}")]
    UnknownSession(String),

    #[error("compositing cancelled")]
    Cancelled,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type CaptureResult<T> = std::result::Result<T, CaptureError>;
