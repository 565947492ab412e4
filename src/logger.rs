//! # Leveled Logger
//!
//! [`LeveledLogger`] writes flat text records to a single log file at eight
//! severities and keeps itself healthy: before emitting a record it checks,
//! at most once per verification interval, that the log file still exists.
//! If an operator or a cleanup job deleted the file, the logger closes its
//! sink and reopens the same path with the same settings, so logging never
//! silently goes dark.
//!
//! ## Design Goals
//!
//! - **Self-healing**: a deleted log file is recreated on the next record
//!   that passes the threshold once the verification interval has elapsed
//! - **Cheap steady state**: the existence check is rate limited, and
//!   suppressed levels return before any check or formatting
//! - **Stable sessions**: every successful open gets a fresh
//!   `<name>-<n>` session name; rejected or failed opens leave it alone
//!
//! ## Concurrency
//!
//! All state lives behind one mutex. Emitters, `open`, `close`,
//! `set_priority` and the verify-and-reopen path each run as a single
//! critical section, so a reopen on one thread can never pull the sink out
//! from under a write on another. A reopen does file I/O while holding the
//! lock; concurrent writers wait for it.
//!
//! ## Failure policy
//!
//! Emitters never fail and never panic. A record that cannot be written is
//! dropped and reported through `tracing` diagnostics only. `open` returns a
//! `Result` and also keeps the last failure text for [`LeveledLogger::last_error`].
//!
//! ## Usage
//!
//! ```no_run
//! use swarmlog::{LeveledLogger, Priority};
//!
//! let logger = LeveledLogger::new("Worker");
//! logger.open("/var/log/worker.log").expect("log file");
//! logger.information("worker started");
//! logger.debug("not written at the default INFORMATION threshold");
//! logger.close();
//! ```

use crate::config::LoggerConfig;
use crate::constants::{
    DEFAULT_FORMAT, DEFAULT_LOGGER_NAME, DEFAULT_VERIFICATION_ENABLED, DEFAULT_VERIFY_TTL,
};
use crate::error::{LoggerError, Result};
use crate::format::PatternFormatter;
use crate::priority::Priority;
use crate::sink::{FileSinkFactory, RotationPolicy, Sink, SinkFactory, SinkSpec};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Settings applied by [`LeveledLogger::open_with`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    pub priority: Priority,
    pub format: String,
    pub rotation: RotationPolicy,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            priority: Priority::default(),
            format: DEFAULT_FORMAT.to_string(),
            rotation: RotationPolicy::disabled(),
        }
    }
}

impl LogOptions {
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn with_rotation(mut self, rotation: RotationPolicy) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Everything the mutex protects.
///
/// Configuration fields (`path`, `priority`, `format`, `rotation`) change only
/// in `open` and `set_priority`; emitting a record may touch `last_verify`
/// and, through a reopen, `sink`, `instance_count` and `internal_name`.
struct LoggerState {
    /// Successful opens so far; a failed open does not count
    instance_count: u64,
    /// `<name>-<instance_count>`, written by `%s` and used in diagnostics
    internal_name: String,
    /// Empty until the first open; reused verbatim by a reopen
    path: PathBuf,
    /// Threshold, mirrored into the live sink's level
    priority: Priority,
    /// Pattern source text, re-parsed on every (re)open
    format: String,
    rotation: RotationPolicy,
    /// `Some` exactly while the logger is open
    sink: Option<Box<dyn Sink>>,
    /// Text of the last failed open, cleared by a successful one
    last_error: String,
    /// When false, emitters only check that a sink is present
    verification_enabled: bool,
    /// Minimum gap between two existence checks of `path`
    verification_interval: Duration,
    /// `None` until the first check, so the first emit always verifies
    last_verify: Option<Instant>,
}

/// Thread-safe, self-verifying leveled file logger
pub struct LeveledLogger {
    name: String,
    factory: Box<dyn SinkFactory>,
    state: Mutex<LoggerState>,
}

impl Default for LeveledLogger {
    fn default() -> Self {
        Self::new(DEFAULT_LOGGER_NAME)
    }
}

impl std::fmt::Debug for LeveledLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("LeveledLogger")
            .field("name", &self.name)
            .field("internal_name", &state.internal_name)
            .field("path", &state.path)
            .field("priority", &state.priority)
            .field("is_open", &state.sink.is_some())
            .finish()
    }
}

impl LeveledLogger {
    /// Create a closed logger that writes through [`FileSinkFactory`]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_factory(name, Box::new(FileSinkFactory))
    }

    /// Create a closed logger that builds its sinks with `factory`
    pub fn with_factory(name: impl Into<String>, factory: Box<dyn SinkFactory>) -> Self {
        let name = name.into();
        let internal_name = session_name(&name, 0);
        Self {
            name,
            factory,
            state: Mutex::new(LoggerState {
                instance_count: 0,
                internal_name,
                path: PathBuf::new(),
                priority: Priority::default(),
                format: DEFAULT_FORMAT.to_string(),
                rotation: RotationPolicy::disabled(),
                sink: None,
                last_error: String::new(),
                verification_enabled: DEFAULT_VERIFICATION_ENABLED,
                verification_interval: DEFAULT_VERIFY_TTL,
                last_verify: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LoggerState> {
        // A panic while holding the lock leaves the state consistent enough to keep logging
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open `path` with the default priority, pattern and rotation
    pub fn open(&self, path: impl AsRef<Path>) -> Result<()> {
        self.open_with(path, LogOptions::default())
    }

    /// Open `path` with explicit settings
    ///
    /// Fails with [`LoggerError::AlreadyOpen`] if a session is active; the
    /// active session is left untouched and a warning is written to it.
    pub fn open_with(&self, path: impl AsRef<Path>, options: LogOptions) -> Result<()> {
        let mut state = self.lock();
        self.open_locked(&mut state, path.as_ref(), options)
    }

    /// Apply verification settings from `config`, then open its path
    ///
    /// A logger that is already open keeps its verification settings; the
    /// call is rejected exactly like a second [`open`](Self::open).
    pub fn open_config(&self, config: &LoggerConfig) -> Result<()> {
        let mut state = self.lock();
        if state.sink.is_none() {
            state.verification_enabled = config.verification.enabled;
            state.verification_interval = config.verification.interval();
        }
        self.open_locked(&mut state, &config.path, config.log_options())
    }

    fn open_locked(&self, state: &mut LoggerState, path: &Path, options: LogOptions) -> Result<()> {
        if state.sink.is_some() {
            let internal_name = state.internal_name.clone();
            warn!(logger = %internal_name, "open called while already open");
            // Straight to the live sink: going through verification here could
            // reopen the session this call is supposed to leave alone.
            if Priority::Warning.passes(state.priority) {
                if let Some(sink) = state.sink.as_mut() {
                    if let Err(e) = sink.write(
                        Priority::Warning,
                        "Logger::open invoked while already in open state.  Close the logger first by calling Logger::close()",
                    ) {
                        warn!(logger = %internal_name, error = %e, "dropped log record");
                    }
                }
            }
            return Err(LoggerError::AlreadyOpen { internal_name });
        }

        state.path = path.to_path_buf();
        state.priority = options.priority;
        state.format = options.format;
        state.rotation = options.rotation;

        let next_count = state.instance_count + 1;
        let internal_name = session_name(&self.name, next_count);

        match self.build_sink(state, &internal_name) {
            Ok(sink) => {
                state.instance_count = next_count;
                state.internal_name = internal_name;
                state.sink = Some(sink);
                state.last_error.clear();
                debug!(logger = %state.internal_name, path = %state.path.display(), "log file opened");
                Ok(())
            }
            Err(e) => {
                Self::close_locked(state);
                state.last_error = format!("Logger::open - {}", e);
                warn!(logger = %internal_name, error = %e, "failed to open log file");
                Err(e)
            }
        }
    }

    fn build_sink(&self, state: &LoggerState, internal_name: &str) -> Result<Box<dyn Sink>> {
        let spec = SinkSpec {
            source: internal_name.to_string(),
            path: state.path.clone(),
            formatter: PatternFormatter::new(&state.format)?,
            level: state.priority,
            rotation: state.rotation,
        };
        let mut sink = self.factory.create(&spec)?;
        sink.write(
            Priority::Notice,
            &format!("Logger::open({}) path: {}", internal_name, state.path.display()),
        )?;
        Ok(sink)
    }

    /// Close the current session; a no-op when already closed
    pub fn close(&self) {
        let mut state = self.lock();
        Self::close_locked(&mut state);
    }

    fn close_locked(state: &mut LoggerState) {
        if let Some(mut sink) = state.sink.take() {
            if let Err(e) = sink.flush() {
                warn!(logger = %state.internal_name, error = %e, "flush on close failed");
            }
            debug!(logger = %state.internal_name, "log file closed");
        }
    }

    /// Change the threshold, updating the live sink if one is open
    pub fn set_priority(&self, priority: Priority) {
        let mut state = self.lock();
        state.priority = priority;
        if let Some(sink) = state.sink.as_mut() {
            sink.set_level(priority);
        }
    }

    pub fn priority(&self) -> Priority {
        self.lock().priority
    }

    /// True when a record at `priority` would pass the current threshold
    pub fn will_log(&self, priority: Priority) -> bool {
        priority.passes(self.lock().priority)
    }

    pub fn fatal(&self, message: &str) {
        self.log(Priority::Fatal, message);
    }

    pub fn critical(&self, message: &str) {
        self.log(Priority::Critical, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Priority::Error, message);
    }

    pub fn warning(&self, message: &str) {
        self.log(Priority::Warning, message);
    }

    pub fn notice(&self, message: &str) {
        self.log(Priority::Notice, message);
    }

    pub fn information(&self, message: &str) {
        self.log(Priority::Information, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(Priority::Debug, message);
    }

    pub fn trace(&self, message: &str) {
        self.log(Priority::Trace, message);
    }

    /// Emit `message` at `priority`; dropped silently if it cannot be written
    pub fn log(&self, priority: Priority, message: &str) {
        let mut state = self.lock();
        self.dispatch_locked(&mut state, priority, message);
    }

    fn dispatch_locked(&self, state: &mut LoggerState, priority: Priority, message: &str) {
        // Suppressed levels must not pay for verification
        if !priority.passes(state.priority) {
            return;
        }
        let ready = if state.verification_enabled {
            self.verify_locked(state, false)
        } else {
            state.sink.is_some()
        };
        if !ready {
            return;
        }
        if let Some(sink) = state.sink.as_mut() {
            if let Err(e) = sink.write(priority, message) {
                warn!(logger = %state.internal_name, error = %e, "dropped log record");
            }
        }
    }

    /// Check that the log file still exists, reopening it if it vanished
    ///
    /// Without `force` the check runs at most once per verification
    /// interval; in between it reports `true` for an open logger.
    pub fn verify_log_file(&self, force: bool) -> bool {
        let mut state = self.lock();
        self.verify_locked(&mut state, force)
    }

    fn verify_locked(&self, state: &mut LoggerState, force: bool) -> bool {
        // Nothing to verify, and a closed logger must not reopen itself
        if state.sink.is_none() {
            return false;
        }

        // Rate limit: inside the window an open logger is trusted without a stat()
        let now = Instant::now();
        if !force {
            if let Some(last) = state.last_verify {
                if now.duration_since(last) < state.verification_interval {
                    return true;
                }
            }
        }
        state.last_verify = Some(now);

        // The check time is recorded before the reopen so a failing reopen
        // is retried once per interval rather than on every record.
        if !state.path.as_os_str().is_empty() && !state.path.exists() {
            info!(logger = %state.internal_name, path = %state.path.display(), "log file missing, reopening");
            Self::close_locked(state);
            let path = state.path.clone();
            let options = LogOptions {
                priority: state.priority,
                format: state.format.clone(),
                rotation: state.rotation,
            };
            return self.open_locked(state, &path, options).is_ok();
        }

        state.sink.is_some()
    }

    /// Flush buffered output of the open sink
    pub fn flush(&self) -> Result<()> {
        let mut state = self.lock();
        let internal_name = state.internal_name.clone();
        match state.sink.as_mut() {
            Some(sink) => sink.flush(),
            None => Err(LoggerError::SinkUnavailable(format!("{} is not open", internal_name))),
        }
    }

    pub fn is_open(&self) -> bool {
        self.lock().sink.is_some()
    }

    /// Text of the last `open` failure; empty after a successful open
    pub fn last_error(&self) -> String {
        self.lock().last_error.clone()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `<name>-<instance_count>`, unique per successful open
    pub fn internal_name(&self) -> String {
        self.lock().internal_name.clone()
    }

    /// Number of successful opens so far
    pub fn instance_count(&self) -> u64 {
        self.lock().instance_count
    }

    pub fn path(&self) -> PathBuf {
        self.lock().path.clone()
    }

    pub fn format(&self) -> String {
        self.lock().format.clone()
    }

    pub fn rotation(&self) -> RotationPolicy {
        self.lock().rotation
    }

    pub fn purge_count(&self) -> u32 {
        self.lock().rotation.purge_count
    }

    pub fn set_verification_enabled(&self, enabled: bool) {
        self.lock().verification_enabled = enabled;
    }

    pub fn verification_enabled(&self) -> bool {
        self.lock().verification_enabled
    }

    pub fn set_verification_interval(&self, interval: Duration) {
        self.lock().verification_interval = interval;
    }

    pub fn verification_interval(&self) -> Duration {
        self.lock().verification_interval
    }

    /// When the log file was last checked, `None` before the first check
    pub fn last_verify_time(&self) -> Option<Instant> {
        self.lock().last_verify
    }
}

impl Drop for LeveledLogger {
    fn drop(&mut self) {
        let mut state = self.lock();
        Self::close_locked(&mut state);
    }
}

fn session_name(name: &str, count: u64) -> String {
    format!("{}-{}", name, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn open_logger(dir: &TempDir, file: &str, priority: Priority) -> (LeveledLogger, PathBuf) {
        let path = dir.path().join(file);
        let logger = LeveledLogger::new("UnitLogger");
        logger
            .open_with(&path, LogOptions::default().with_priority(priority).with_format("%p %t"))
            .unwrap();
        (logger, path)
    }

    #[test]
    fn test_new_logger_is_closed() {
        let logger = LeveledLogger::default();
        assert!(!logger.is_open());
        assert_eq!(logger.name(), DEFAULT_LOGGER_NAME);
        assert_eq!(logger.internal_name(), "SwarmLogger-0");
        assert_eq!(logger.instance_count(), 0);
        assert_eq!(logger.path(), PathBuf::new());
        assert!(logger.verification_enabled());
        assert_eq!(logger.verification_interval(), Duration::from_secs(5));
        assert!(logger.last_verify_time().is_none());
    }

    #[test]
    fn test_open_writes_notice() {
        let dir = TempDir::new().unwrap();
        let (logger, path) = open_logger(&dir, "notice.log", Priority::Information);

        assert!(logger.is_open());
        assert_eq!(logger.internal_name(), "UnitLogger-1");
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("NOTICE Logger::open(UnitLogger-1) path: "));
        assert!(text.contains("notice.log"));
    }

    #[test]
    fn test_notice_suppressed_below_threshold() {
        let dir = TempDir::new().unwrap();
        let (_logger, path) = open_logger(&dir, "quiet.log", Priority::Warning);
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }

    #[test]
    fn test_set_priority_updates_live_sink() {
        let dir = TempDir::new().unwrap();
        let (logger, path) = open_logger(&dir, "prio.log", Priority::Warning);

        logger.debug("before");
        logger.set_priority(Priority::Debug);
        logger.debug("after");

        let text = fs::read_to_string(&path).unwrap();
        assert!(!text.contains("before"));
        assert!(text.contains("DEBUG after"));
        assert_eq!(logger.priority(), Priority::Debug);
    }

    #[test]
    fn test_bad_format_fails_open() {
        let dir = TempDir::new().unwrap();
        let logger = LeveledLogger::new("Broken");
        let result = logger.open_with(
            dir.path().join("x.log"),
            LogOptions::default().with_format("%Z"),
        );

        assert!(matches!(result, Err(LoggerError::InvalidFormat { .. })));
        assert!(!logger.is_open());
        assert!(logger.last_error().starts_with("Logger::open - "));
        assert_eq!(logger.instance_count(), 0);
    }

    #[test]
    fn test_successful_open_clears_last_error() {
        let dir = TempDir::new().unwrap();
        let logger = LeveledLogger::new("Recover");
        assert!(logger.open(dir.path().join("missing").join("x.log")).is_err());
        assert!(!logger.last_error().is_empty());

        logger.open(dir.path().join("x.log")).unwrap();
        assert_eq!(logger.last_error(), "");
        assert_eq!(logger.internal_name(), "Recover-1");
    }

    #[test]
    fn test_flush_requires_open_sink() {
        let logger = LeveledLogger::new("Flush");
        assert!(matches!(logger.flush(), Err(LoggerError::SinkUnavailable(_))));
    }

    #[test]
    fn test_verify_closed_logger_is_false() {
        let logger = LeveledLogger::new("Closed");
        assert!(!logger.verify_log_file(true));
        assert!(logger.last_verify_time().is_none());
    }

    #[test]
    fn test_drop_closes_sink() {
        let dir = TempDir::new().unwrap();
        let (logger, path) = open_logger(&dir, "drop.log", Priority::Information);
        logger.information("last words");
        drop(logger);
        assert!(fs::read_to_string(&path).unwrap().contains("last words"));
    }
}
