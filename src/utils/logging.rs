//! Logging setup plus per-module switchable logging macros.
//!
//! Modules that are chatty during a scan (the poll loop fires every 100ms)
//! declare a module-level flag and log through the crate-root macros:
//!
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_debug, log_info};
//!
//! log_debug!("frame {} had no codes", n);
//! ```
//!
//! Flipping the flag to `false` silences the module without touching the
//! global `RUST_LOG` filter.

use std::sync::Once;

static INIT: Once = Once::new();

/// Install `env_logger` as the `log` backend.
///
/// Reads `RUST_LOG`, defaulting to `info` when it is unset. Safe to call more
/// than once; hosts and tests may both try to initialize.
pub fn init_logging() {
    INIT.call_once(|| {
        let filters = std::env::var(FILTER_ENV).ok();
        let result = builder(filters.as_deref()).try_init();

        if result.is_ok() {
            log::info!("fieldscan logging initialized");
        }
    });
}

const FILTER_ENV: &str = "RUST_LOG";

/// `info` everywhere, then any `RUST_LOG` directives on top.
fn builder(filters: Option<&str>) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log::LevelFilter::Info);
    if let Some(filters) = filters {
        builder.parse_filters(filters);
    }
    builder
}

/// Info-level logging gated by the calling module's `ENABLE_LOGS` const.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// Debug-level logging gated by the calling module's `ENABLE_LOGS` const.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

/// Warn-level logging gated by the calling module's `ENABLE_LOGS` const.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// Error-level logging gated by the calling module's `ENABLE_LOGS` const.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}
