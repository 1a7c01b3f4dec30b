pub mod config;
pub mod region;

pub use config::DetectorConfig;
pub use region::detect;
