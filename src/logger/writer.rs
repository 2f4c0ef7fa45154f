//! Log writer module
//!
//! Thread-safe log writing to stdout/stderr, append-mode files, or an
//! in-memory buffer. Each line is written under the target's lock, so
//! concurrent requests never interleave within a line.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::LogLevel;

/// Log output target
enum LogTarget {
    /// Write to stdout
    Stdout,
    /// Write to stderr
    Stderr,
    /// Append to a file
    File(Mutex<File>),
    /// Keep lines in memory (tests)
    Memory(Mutex<Vec<String>>),
}

impl LogTarget {
    fn file(path: &str) -> io::Result<Self> {
        open_log_file(path).map(|f| Self::File(Mutex::new(f)))
    }

    fn write_line(&self, message: &str) {
        match self {
            Self::Stdout => println!("{message}"),
            Self::Stderr => eprintln!("{message}"),
            Self::File(file) => {
                let _ = writeln!(lock(file), "{message}");
            }
            Self::Memory(lines) => lock(lines).push(message.to_string()),
        }
    }

    #[cfg(test)]
    fn lines(&self) -> Vec<String> {
        match self {
            Self::Memory(lines) => lock(lines).clone(),
            _ => Vec::new(),
        }
    }
}

/// Thread-safe log writer
///
/// Info and access lines go to the access target, warnings and errors to
/// the error target.
pub struct LogWriter {
    access: LogTarget,
    error: LogTarget,
    level: LogLevel,
}

impl LogWriter {
    /// Create a writer with optional file paths, falling back to stdout/stderr
    pub fn new(
        access_log_file: Option<&str>,
        error_log_file: Option<&str>,
        level: LogLevel,
    ) -> io::Result<Self> {
        let access = match access_log_file {
            Some(path) => LogTarget::file(path)?,
            None => LogTarget::Stdout,
        };
        let error = match error_log_file {
            Some(path) => LogTarget::file(path)?,
            None => LogTarget::Stderr,
        };

        Ok(Self {
            access,
            error,
            level,
        })
    }

    /// Writer that keeps every line in memory, at debug level
    pub fn in_memory() -> Self {
        Self {
            access: LogTarget::Memory(Mutex::new(Vec::new())),
            error: LogTarget::Memory(Mutex::new(Vec::new())),
            level: LogLevel::Debug,
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn error(&self, message: &str) {
        self.write_error(LogLevel::Error, &format!("[ERROR] {message}"));
    }

    pub fn warn(&self, message: &str) {
        self.write_error(LogLevel::Warn, &format!("[WARN] {message}"));
    }

    pub fn info(&self, message: &str) {
        self.write_access(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.write_access(LogLevel::Debug, &format!("[DEBUG] {message}"));
    }

    /// Write a pre-formatted access log line.
    /// Access logging is switched on and off by configuration, not by level.
    pub fn access(&self, line: &str) {
        self.access.write_line(line);
    }

    /// Lines captured by an in-memory error target
    #[cfg(test)]
    pub fn captured_errors(&self) -> Vec<String> {
        self.error.lines()
    }

    /// Lines captured by an in-memory access target
    #[cfg(test)]
    pub fn captured_access(&self) -> Vec<String> {
        self.access.lines()
    }

    fn write_error(&self, level: LogLevel, message: &str) {
        if self.level.allows(level) {
            self.error.write_line(message);
        }
    }

    fn write_access(&self, level: LogLevel, message: &str) {
        if self.level.allows(level) {
            self.access.write_line(message);
        }
    }
}

/// Lock a mutex, recovering the data if a writer panicked mid-line
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}
