pub mod controller;
pub mod loop_worker;
pub mod sampler;
pub mod state;

pub use controller::{BurstController, DEFAULT_REFRESH_HZ};
pub use loop_worker::BoxedFrameSource;
pub use sampler::{
    BurstOutcome, BurstSampler, SampleRecord, SessionHandle, DEFAULT_JPEG_QUALITY, MAX_BURST_FPS,
    MIN_BURST_FPS,
};
pub use state::BurstState;
