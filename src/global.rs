//! Process-wide default logger.
//!
//! Components should receive an `Arc<LeveledLogger>` from whoever composes
//! the program. For code that cannot be handed one, this module keeps a
//! single shared handle that is created on first use and can be released
//! explicitly at teardown.

use crate::constants::DEFAULT_LOGGER_NAME;
use crate::logger::LeveledLogger;
use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex, PoisonError};

static INSTANCE: Lazy<Mutex<Option<Arc<LeveledLogger>>>> = Lazy::new(|| Mutex::new(None));

/// The process-wide logger, created closed and named `SwarmLogger` on first call
pub fn instance() -> Arc<LeveledLogger> {
    instance_named(DEFAULT_LOGGER_NAME)
}

/// Like [`instance`], but a logger created by this call is named `name`.
/// An existing logger is returned unchanged whatever its name.
pub fn instance_named(name: &str) -> Arc<LeveledLogger> {
    let mut slot = INSTANCE.lock().unwrap_or_else(PoisonError::into_inner);
    slot.get_or_insert_with(|| Arc::new(LeveledLogger::new(name)))
        .clone()
}

/// Drop the process-wide handle.
///
/// The logger closes once the last outstanding `Arc` is gone. The next call
/// to [`instance`] creates a fresh, closed logger.
pub fn release_instance() {
    let released = INSTANCE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    // Drop outside the slot lock so closing cannot block `instance()`
    drop(released);
}

/// True while a process-wide logger exists
pub fn is_initialized() -> bool {
    INSTANCE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}
