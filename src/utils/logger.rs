//! Logger utility for application-wide logging
//!
//! This module provides a logger that works alongside the standard log
//! crate: records go to the console through `env_logger` and are copied
//! into a per-run report file.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use log::{Log, Record, Metadata, LevelFilter};

/// Custom logger implementation
pub struct Logger {
    /// File handle for log output
    file: Mutex<Option<File>>,
    /// Console output, filtered by level and `RUST_LOG`
    console: Option<env_logger::Logger>,
    level: LevelFilter,
}

impl Logger {
    /// Creates a new logger instance writing to `log_file`
    pub fn new(log_file: &str) -> io::Result<Self> {
        let file = File::create(Path::new(log_file))?;
        Ok(Logger {
            file: Mutex::new(Some(file)),
            console: None,
            level: LevelFilter::Debug,
        })
    }

    /// Creates a logger with no report file
    pub fn disabled() -> Self {
        Logger {
            file: Mutex::new(None),
            console: None,
            level: LevelFilter::Off,
        }
    }

    /// Logs a message to the log file
    pub fn log(&self, message: &str) -> io::Result<()> {
        let mut guard = self.file.lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
        if let Some(file) = guard.as_mut() {
            writeln!(file, "{}", message)?;
            file.flush()?;
        }
        Ok(())
    }

    /// Static method to initialize the global logger
    ///
    /// Console verbosity defaults to `level` and can be overridden with
    /// `RUST_LOG`; the file receives every record at `level` or above.
    pub fn init_global_logger(log_file: &str, level: LevelFilter) -> io::Result<()> {
        let console = env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .build();

        let mut global_logger = Logger::new(log_file)?;
        global_logger.level = level.max(console.filter());
        global_logger.console = Some(console);

        let max_level = global_logger.level;
        if log::set_boxed_logger(Box::new(global_logger)).is_err() {
            eprintln!("Warning: Global logger was already initialized");
        }

        log::set_max_level(max_level);
        Ok(())
    }
}

// Implement the Log trait to make our Logger work with the log crate
impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if let Some(console) = &self.console {
            if console.matches(record) {
                console.log(record);
            }
        }

        if self.enabled(record.metadata()) {
            let message = format!("[{}] {}: {}", record.level(), record.target(), record.args());
            let _ = Logger::log(self, &message);
        }
    }

    fn flush(&self) {
        // Already flushing in the log method
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_messages_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        let logger = Logger::new(path.to_str().unwrap()).unwrap();
        logger.log("first").unwrap();
        logger.log("second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn disabled_logger_accepts_messages() {
        assert!(Logger::disabled().log("ignored").is_ok());
    }
}
