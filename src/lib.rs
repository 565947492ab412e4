//! # swarmlog
//!
//! A leveled file logger that keeps itself alive. Records are written at one
//! of eight severities to a single log file; before writing, the logger
//! checks (at most once per verification interval) that the file still
//! exists and transparently reopens it if it was deleted.
//!
//! ## Module Map
//!
//! - [`logger`]: the [`LeveledLogger`] itself
//! - [`priority`]: the eight severities
//! - [`format`]: `%`-pattern line formatting
//! - [`sink`]: file sink with optional daily rotation and gzip archives
//! - [`config`]: TOML configuration
//! - [`global`]: optional process-wide default instance
//! - [`app`]: composition boundary that owns the default instance
//! - [`diagnostics`]: `tracing` setup for the crate's own diagnostics

pub mod app;
pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod global;
pub mod logger;
pub mod priority;
pub mod sink;

pub use app::Application;
pub use config::LoggerConfig;
pub use error::{LoggerError, Result};
pub use logger::{LeveledLogger, LogOptions};
pub use priority::Priority;
pub use sink::{FileSink, FileSinkFactory, RotationPolicy, Sink, SinkFactory, SinkSpec};
