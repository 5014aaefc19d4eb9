#![deny(missing_docs)]
//! Shared logging utilities for the tubebatch workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! size-based rotation for the application log file, routing of download-tool
//! output lines to log levels, and a minimal test initializer for the global
//! logger.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default size at which the application log is rotated.
pub const DEFAULT_ROTATE_BYTES: u64 = 5 * 1024 * 1024;

/// Default number of rotated log files kept next to the live one.
pub const DEFAULT_ROTATE_KEEP: usize = 5;

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Rotates `path` when it has grown past `max_bytes`.
///
/// `app.log` becomes `app.log.1`, `app.log.1` becomes `app.log.2` and so on,
/// keeping at most `keep` rotated files. Returns `true` when a rotation took
/// place. A missing log file is not an error.
pub fn rotate_log_file(path: &Path, max_bytes: u64, keep: usize) -> io::Result<bool> {
    let len = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    if len < max_bytes {
        return Ok(false);
    }
    if keep == 0 {
        fs::remove_file(path)?;
        return Ok(true);
    }

    let oldest = rotated_name(path, keep);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }
    for index in (1..keep).rev() {
        let from = rotated_name(path, index);
        if from.exists() {
            fs::rename(&from, rotated_name(path, index + 1))?;
        }
    }
    fs::rename(path, rotated_name(path, 1))?;
    Ok(true)
}

fn rotated_name(path: &Path, index: usize) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

/// Level assigned to one line of download-tool output.
pub fn engine_line_level(line: &str) -> log::Level {
    if line.starts_with("[debug] ") {
        log::Level::Debug
    } else if line.starts_with("WARNING:") {
        log::Level::Warn
    } else if line.starts_with("ERROR:") {
        log::Level::Error
    } else {
        log::Level::Info
    }
}

/// Forwards one line of download-tool output to the global logger.
pub fn log_engine_line(line: &str) {
    let line = line.trim_end();
    if line.is_empty() {
        return;
    }
    log::log!(engine_line_level(line), "{}", line);
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
