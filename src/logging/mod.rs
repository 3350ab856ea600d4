//! Logging and observability
//!
//! Structured logging through `tracing`, with:
//! - Configurable log levels (config file, `--log-level`, `RUST_LOG`)
//! - Optional JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use floodline::logging::init_logging;
//! use floodline::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(country = "KEN", "Processing country");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log an item that was skipped by the pipeline
///
/// # Example
///
/// ```no_run
/// use floodline::log_item_skipped;
///
/// log_item_skipped!("KEN/river/rp100/KEN.1_1", "clip", "empty geometry");
/// ```
#[macro_export]
macro_rules! log_item_skipped {
    ($key:expr, $stage:expr, $reason:expr) => {
        tracing::warn!(
            item = %$key,
            stage = %$stage,
            reason = %$reason,
            "Item skipped"
        );
    };
}

/// Log the completion of a pipeline stage for one item
///
/// # Example
///
/// ```no_run
/// use floodline::log_stage_complete;
/// use std::time::Duration;
///
/// log_stage_complete!("KEN/river/rp100/KEN.1_1", "vectorized", 12, Duration::from_millis(40));
/// ```
#[macro_export]
macro_rules! log_stage_complete {
    ($key:expr, $stage:expr, $count:expr, $duration:expr) => {
        tracing::debug!(
            item = %$key,
            stage = %$stage,
            count = $count,
            duration_ms = $duration.as_millis(),
            "Stage completed"
        );
    };
}
