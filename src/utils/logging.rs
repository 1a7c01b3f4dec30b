//! Logging setup plus macros that can be silenced per module.
//!
//! Hot-path modules (the burst loop runs once per display refresh) declare a
//! module-level switch and log through these macros:
//!
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_info, log_warn};
//!
//! log_info!("burst {} sampled frame {}", session_id, index);
//! ```

use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes `env_logger` once for the whole process.
///
/// Honors `RUST_LOG`; defaults to `info` when unset. Safe to call repeatedly,
/// and a no-op when the host installed its own logger first.
pub fn init_logging() {
    INIT.call_once(|| {
        let result = env_logger::Builder::new()
            .filter_level(log::LevelFilter::Info)
            .parse_default_env()
            .try_init();

        if result.is_ok() {
            log::info!("scopecapture logging initialized");
        }
    });
}

/// `log::info!` gated on the calling module's `ENABLE_LOGS` const.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// `log::debug!` gated on the calling module's `ENABLE_LOGS` const.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

/// `log::warn!` gated on the calling module's `ENABLE_LOGS` const.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// `log::error!` gated on the calling module's `ENABLE_LOGS` const.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}
