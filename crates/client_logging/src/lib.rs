#![deny(missing_docs)]
//! Shared logging utilities for the classifier client workspace.
//!
//! This crate provides the `client_*` logging macros used across the codebase,
//! the logger setup used by the terminal frontend, and a minimal test
//! initializer for the global logger.

use std::fs::File;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Default log file, relative to the current working directory.
pub const DEFAULT_LOG_FILE: &str = "./classify_client.log";

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! client_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! client_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! client_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! client_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! client_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogDestination {
    /// Logging disabled.
    Off,
    /// Write to the terminal (stderr for warnings and errors).
    Terminal,
    /// Write to a log file.
    #[default]
    File,
    /// Write to both the terminal and a log file.
    Both,
}

/// Initializes the global logger.
///
/// The interactive frontend owns stdout, so the default destination is a file.
/// Failing to create the file only drops that logger; the call never fails.
pub fn initialize(destination: LogDestination, level: LevelFilter, log_path: &Path) {
    let loggers = build_loggers(destination, level, log_path);
    if loggers.is_empty() {
        return;
    }
    let _ = CombinedLogger::init(loggers);
}

/// Builds the loggers for `destination` without installing them.
pub fn build_loggers(
    destination: LogDestination,
    level: LevelFilter,
    log_path: &Path,
) -> Vec<Box<dyn SharedLogger>> {
    let config = build_config();

    match destination {
        LogDestination::Off => Vec::new(),
        LogDestination::Terminal => vec![terminal_logger(level, config)],
        LogDestination::File => create_file_logger(level, config, log_path)
            .map(|logger| vec![logger as Box<dyn SharedLogger>])
            .unwrap_or_default(),
        LogDestination::Both => {
            let mut loggers = vec![terminal_logger(level, config.clone())];
            if let Some(file_logger) = create_file_logger(level, config, log_path) {
                loggers.push(file_logger);
            }
            loggers
        }
    }
}

/// Returns the default log file path.
pub fn default_log_path() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn terminal_logger(level: LevelFilter, config: Config) -> Box<dyn SharedLogger> {
    TermLogger::new(level, config, TerminalMode::Stderr, ColorChoice::Auto)
}

fn create_file_logger(
    level: LevelFilter,
    config: Config,
    log_path: &Path,
) -> Option<Box<WriteLogger<File>>> {
    match File::create(log_path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", log_path, err);
            None
        }
    }
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::{build_loggers, LogDestination};
    use log::LevelFilter;
    use tempfile::TempDir;

    #[test]
    fn off_builds_no_loggers() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("client.log");
        let loggers = build_loggers(LogDestination::Off, LevelFilter::Info, &path);
        assert!(loggers.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn file_destination_creates_log_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("client.log");
        let loggers = build_loggers(LogDestination::File, LevelFilter::Info, &path);
        assert_eq!(loggers.len(), 1);
        assert!(path.is_file());
    }

    #[test]
    fn both_falls_back_to_terminal_when_file_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing_dir").join("client.log");
        let loggers = build_loggers(LogDestination::Both, LevelFilter::Debug, &path);
        assert_eq!(loggers.len(), 1);
    }
}
