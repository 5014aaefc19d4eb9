//! Platform logging initialization for tubebatch.
//!
//! Writes logs to `tubebatch.log` in the application directory, rotating it
//! once it grows past 5 MiB.

use std::fs::{File, OpenOptions};
use std::path::Path;

use engine_logging::{rotate_log_file, DEFAULT_ROTATE_BYTES, DEFAULT_ROTATE_KEEP};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

pub const LOG_FILENAME: &str = "tubebatch.log";

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum LogDestination {
    /// Write to the log file only; the terminal shows progress bars.
    #[default]
    File,
    /// Write to terminal (stderr).
    Terminal,
    /// Write to both file and terminal.
    Both,
}

/// Initialize the logger with the specified destination.
pub fn initialize(destination: LogDestination, log_path: &Path) {
    let config = build_config();

    let loggers: Vec<Box<dyn SharedLogger>> = match destination {
        LogDestination::File => {
            if let Some(file_logger) = create_file_logger(LevelFilter::Debug, config, log_path) {
                vec![file_logger]
            } else {
                return;
            }
        }
        LogDestination::Terminal => vec![terminal_logger(config)],
        LogDestination::Both => {
            let mut loggers: Vec<Box<dyn SharedLogger>> = vec![terminal_logger(config.clone())];
            if let Some(file_logger) = create_file_logger(LevelFilter::Debug, config, log_path) {
                loggers.push(file_logger);
            }
            loggers
        }
    };

    let _ = CombinedLogger::init(loggers);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn terminal_logger(config: Config) -> Box<TermLogger> {
    TermLogger::new(
        LevelFilter::Info,
        config,
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
}

fn create_file_logger(
    level: LevelFilter,
    config: Config,
    log_path: &Path,
) -> Option<Box<WriteLogger<File>>> {
    if let Err(err) = rotate_log_file(log_path, DEFAULT_ROTATE_BYTES, DEFAULT_ROTATE_KEEP) {
        eprintln!("Warning: Could not rotate log file {:?}: {}", log_path, err);
    }
    match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", log_path, err);
            None
        }
    }
}
