pub mod compose;
pub mod layout;
pub mod slice;
pub mod transform;

pub use compose::{compose, compose_session, CompositeImage, CompositeKind};
pub use layout::GridLayout;
pub use transform::{CompositorConfig, MosaicTransform};
