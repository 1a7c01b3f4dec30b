pub mod frame;
pub mod region;
pub mod session;

pub use frame::{Frame, FrameSource};
pub use region::{MaskShape, Region};
pub use session::{BurstSession, BurstStatus};
