//! Error types for the logger

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while opening, configuring or writing a log
#[derive(Error, Debug)]
pub enum LoggerError {
    /// `open` was called while a sink is already open
    #[error("logger {internal_name} is already open; call close() first")]
    AlreadyOpen { internal_name: String },

    /// Filesystem failure while creating, writing or rotating the log file
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The line pattern could not be parsed
    #[error("invalid format pattern {pattern:?}: {reason}")]
    InvalidFormat { pattern: String, reason: String },

    /// Unknown priority name or number
    #[error("invalid priority: {0:?}")]
    InvalidPriority(String),

    /// The sink was not available right after construction
    #[error("sink unavailable: {0}")]
    SinkUnavailable(String),

    /// Configuration file could not be located, read or parsed
    #[error("configuration error: {0}")]
    Config(String),
}

impl LoggerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LoggerError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, LoggerError>;
