//! Logging setup.
//!
//! Thin wrapper over env_logger so every entry point initializes logging
//! the same way.

use env_logger::Builder;
use log::LevelFilter;
use std::env;

use crate::error::ExecError;

/// Initialize the logging system. `RUST_LOG` wins over the given default.
pub fn init(default_level: &str) -> Result<(), ExecError> {
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| default_level.to_string());

    let level_filter = match log_level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    };

    Builder::from_default_env()
        .filter_level(level_filter)
        .format_timestamp_millis()
        .init();

    log::info!("logging initialized, level = {}", log_level);

    Ok(())
}
