//! [`SyncLogger`] implementations

use dirsync_types::SyncLogger;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use tracing::Level;

/// Log target used for every engine event
pub const LOG_TARGET: &str = "dirsync::sync";

/// Forwards engine events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    /// Create a new tracing-backed logger
    pub fn new() -> Self {
        Self
    }
}

impl SyncLogger for TracingLogger {
    fn info(&self, message: fmt::Arguments<'_>) {
        tracing::info!(target: LOG_TARGET, "{}", message);
    }

    fn error(&self, message: fmt::Arguments<'_>) {
        tracing::error!(target: LOG_TARGET, "{}", message);
    }
}

/// One captured event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// `INFO` or `ERROR`
    pub level: Level,
    /// Rendered message
    pub message: String,
}

/// Keeps every event in memory, in arrival order
#[derive(Debug, Default)]
pub struct RecordingLogger {
    records: Mutex<Vec<LogRecord>>,
}

impl RecordingLogger {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all captured events
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages logged at `INFO`
    pub fn infos(&self) -> Vec<String> {
        self.messages_at(Level::INFO)
    }

    /// Messages logged at `ERROR`
    pub fn errors(&self) -> Vec<String> {
        self.messages_at(Level::ERROR)
    }

    fn messages_at(&self, level: Level) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|record| record.level == level)
            .map(|record| record.message)
            .collect()
    }

    fn push(&self, level: Level, message: fmt::Arguments<'_>) {
        // A poisoned lock still holds valid records; keep appending.
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogRecord {
                level,
                message: message.to_string(),
            });
    }
}

impl SyncLogger for RecordingLogger {
    fn info(&self, message: fmt::Arguments<'_>) {
        self.push(Level::INFO, message);
    }

    fn error(&self, message: fmt::Arguments<'_>) {
        self.push(Level::ERROR, message);
    }
}
