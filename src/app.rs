//! # Application Lifecycle
//!
//! [`Application`] is the outermost composition boundary: it sets up
//! diagnostics, opens the process-wide logger from a [`LoggerConfig`], and
//! tears everything down again when dropped. Code below it should take the
//! `Arc<LeveledLogger>` from [`Application::logger`] instead of reaching for
//! the global.

use crate::config::LoggerConfig;
use crate::diagnostics::init_diagnostics;
use crate::error::Result;
use crate::global;
use crate::logger::LeveledLogger;
use std::sync::Arc;
use tracing::info;

/// Owns the process-wide logger for the lifetime of the program
#[derive(Debug)]
pub struct Application {
    logger: Arc<LeveledLogger>,
    config: LoggerConfig,
}

impl Application {
    /// Initialize diagnostics and open the process-wide logger
    ///
    /// If the logger cannot be opened, the global handle is released again
    /// and the error returned.
    pub fn start(config: LoggerConfig) -> Result<Self> {
        init_diagnostics();

        let logger = global::instance_named(&config.name);
        if let Err(e) = logger.open_config(&config) {
            drop(logger);
            global::release_instance();
            return Err(e);
        }
        info!(path = %config.path.display(), priority = %config.priority, "application logging started");

        Ok(Self { logger, config })
    }

    /// Shared handle for components that log
    pub fn logger(&self) -> Arc<LeveledLogger> {
        Arc::clone(&self.logger)
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        self.logger.close();
        global::release_instance();
        info!("application logging stopped");
    }
}
