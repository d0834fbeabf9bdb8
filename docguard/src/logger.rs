// docguard/src/logger.rs
//! Logger initialization for the CLI.
//!
//! Respects `RUST_LOG` unless an explicit level is forced by `--quiet` or
//! `--debug`.

use log::LevelFilter;

/// Initializes env_logger once; repeated calls are ignored so tests can
/// drive commands in-process.
pub fn init_logger(forced_level: Option<LevelFilter>) {
    let mut builder = env_logger::Builder::from_default_env();
    if let Some(level) = forced_level {
        builder.filter_level(level);
    }
    builder.format_timestamp_secs();
    let _ = builder.try_init();
}
