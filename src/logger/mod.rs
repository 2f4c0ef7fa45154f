//! Logger module
//!
//! Provides logging utilities for the server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support
//!
//! There is no global logger: a [`LogWriter`] is built at startup and handed
//! to whoever needs it.

mod format;
mod writer;

pub use format::{AccessLogEntry, AccessLogFormat};
pub use writer::LogWriter;

use serde::Deserialize;
use std::net::SocketAddr;

use crate::config::Config;

/// Minimum severity written by a [`LogWriter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    /// Whether a message at `level` passes this filter
    pub fn allows(self, level: Self) -> bool {
        level <= self
    }
}

/// Build the writer described by the logging section of `config`
pub fn init(config: &Config) -> std::io::Result<LogWriter> {
    LogWriter::new(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        config.logging.level,
    )
}

pub fn log_server_start(log: &LogWriter, addr: &SocketAddr, config: &Config) {
    log.info("======================================");
    log.info("Location gate started successfully");
    log.info(&format!("Listening on: http://{addr}"));
    log.info(&format!("Log level: {:?}", log.level()));
    if let Some(workers) = config.server.workers {
        log.info(&format!("Worker threads: {workers}"));
    }
    if let Some(max) = config.performance.max_connections {
        log.info(&format!("Max connections: {max}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        log.info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        log.info(&format!("Error log: {path}"));
    }
    log.info("======================================");
}

pub fn log_connection_error(log: &LogWriter, err: &impl std::fmt::Debug) {
    log.error(&format!("Failed to serve connection: {err:?}"));
}

pub fn log_shutdown(log: &LogWriter, active: usize) {
    log.info(&format!(
        "[Shutdown] Stopped accepting connections, {active} still active"
    ));
}
