//! # System Log
//!
//! Leveled console logging for the shell.
//!
//! ## Philosophy
//!
//! Log output is a user-facing contract here, not tracing: command failures
//! are advisory messages on the console, and the session always continues.
//! Entries are structured values first, formatted text second, so tests can
//! capture and assert on them without scraping stdout.

use std::cell::RefCell;
use std::fmt;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Debug information
    Debug,
    /// Informational messages
    Info,
    /// Warnings
    Warn,
    /// Errors
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// A log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
}

impl LogEntry {
    /// Creates a new log entry
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    /// Renders the entry in console form: ` [LEVEL] message`
    pub fn render(&self) -> String {
        format!(" [{}] {}", self.level, self.message)
    }
}

/// Destination for log entries
pub trait LogSink {
    /// Emits one entry
    fn emit(&self, entry: LogEntry);

    /// Emits an info-level message
    fn info(&self, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.emit(LogEntry::new(LogLevel::Info, message));
    }

    /// Emits an error-level message
    fn error(&self, message: impl Into<String>)
    where
        Self: Sized,
    {
        self.emit(LogEntry::new(LogLevel::Error, message));
    }
}

/// Console sink: prints rendered entries to stdout
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn emit(&self, entry: LogEntry) {
        println!("{}", entry.render());
    }
}

/// Capture sink for tests: records entries instead of printing
pub struct CaptureSink {
    entries: RefCell<Vec<LogEntry>>,
}

impl CaptureSink {
    /// Creates an empty capture sink
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
        }
    }

    /// Returns a copy of the captured entries
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.borrow().clone()
    }

    /// Returns true if any captured entry is at error level
    pub fn has_errors(&self) -> bool {
        self.entries
            .borrow()
            .iter()
            .any(|e| e.level == LogLevel::Error)
    }
}

impl Default for CaptureSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for CaptureSink {
    fn emit(&self, entry: LogEntry) {
        self.entries.borrow_mut().push(entry);
    }
}
