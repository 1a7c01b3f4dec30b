//! Capture core for fiberscope/endoscopy workstations: lit-region detection,
//! the single-photo capture mask, timed burst sampling and mosaic/kymogram
//! compositing of finished bursts.

pub mod burst;
pub mod codec;
pub mod compositor;
pub mod db;
pub mod detection;
pub mod error;
pub mod mask;
pub mod models;
pub mod report;
pub mod settings;
pub mod station;
pub mod storage;
pub mod utils;

pub use burst::{BoxedFrameSource, BurstController, BurstOutcome, SessionHandle};
pub use compositor::{compose, compose_session, CompositeImage, CompositeKind, MosaicTransform};
pub use db::Database;
pub use detection::{detect, DetectorConfig};
pub use error::{CaptureError, CaptureResult};
pub use mask::{apply_mask, CaptureMask, DragMode, MaskInteraction};
pub use models::{BurstSession, Frame, FrameSource, MaskShape, Region};
pub use report::{CapturedImage, Enhancer, ImageKind, ReportImages};
pub use settings::{CaptureSettings, SettingsStore};
pub use station::CaptureStation;
pub use storage::{FsStorage, MemoryStorage, Storage};
pub use utils::init_logging;
