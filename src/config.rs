//! # Configuration Management Module
//!
//! Logger settings can be kept in a TOML file so that deployments change the
//! log path, threshold or rotation without recompiling. Every section has
//! defaults, so a config file only needs the keys it wants to override.
//!
//! ```toml
//! path = "/var/log/swarm/app.log"
//! priority = "notice"
//!
//! [rotation]
//! enabled = true
//! purge_count = 7
//!
//! [verification]
//! interval_seconds = 10
//! ```
//!
//! ## Configuration Storage Locations
//!
//! - **Windows**: `%APPDATA%\swarmlog\config.toml`
//! - **macOS**: `~/Library/Application Support/swarmlog/config.toml`
//! - **Linux**: `~/.config/swarmlog/config.toml`

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_FORMAT, DEFAULT_LOGGER_NAME, DEFAULT_LOG_FILE,
    DEFAULT_PURGE_COUNT, DEFAULT_ROTATION_ENABLED, DEFAULT_VERIFICATION_ENABLED,
    DEFAULT_VERIFY_TTL_SECONDS,
};
use crate::error::{LoggerError, Result};
use crate::logger::LogOptions;
use crate::priority::Priority;
use crate::sink::RotationPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Rotation settings.
///
/// Rotation and retention are separate switches: a purge count alone does
/// not turn rotation on.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RotationConfig {
    /// Roll the log over daily into gzip archives
    pub enabled: bool,
    /// Archives to keep (0 keeps all)
    pub purge_count: u32,
}

/// Log file verification settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct VerificationConfig {
    /// Check that the log file still exists before writing
    pub enabled: bool,
    /// Minimum seconds between two checks
    pub interval_seconds: u64,
}

/// Complete logger configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggerConfig {
    /// Base name of the logger, used for `%s` and session names
    pub name: String,
    /// Log file location
    pub path: PathBuf,
    /// Least severe priority that is written
    pub priority: Priority,
    /// Line pattern, see [`crate::format`]
    pub format: String,
    pub rotation: RotationConfig,
    pub verification: VerificationConfig,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            enabled: DEFAULT_ROTATION_ENABLED,
            purge_count: DEFAULT_PURGE_COUNT,
        }
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            enabled: DEFAULT_VERIFICATION_ENABLED,
            interval_seconds: DEFAULT_VERIFY_TTL_SECONDS,
        }
    }
}

impl VerificationConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

impl From<&RotationConfig> for RotationPolicy {
    fn from(config: &RotationConfig) -> Self {
        RotationPolicy {
            enabled: config.enabled,
            purge_count: config.purge_count,
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_LOGGER_NAME.to_string(),
            path: PathBuf::from(DEFAULT_LOG_FILE),
            priority: Priority::default(),
            format: DEFAULT_FORMAT.to_string(),
            rotation: RotationConfig::default(),
            verification: VerificationConfig::default(),
        }
    }
}

impl LoggerConfig {
    /// Settings passed to `LeveledLogger::open_with`
    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            priority: self.priority,
            format: self.format.clone(),
            rotation: RotationPolicy::from(&self.rotation),
        }
    }

    /// Parse a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| LoggerError::Config(e.to_string()))
    }

    /// Read and parse the file at `path`
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| LoggerError::io(path, e))?;
        Self::from_toml(&content)
    }

    /// Load from the platform config location, falling back to defaults
    ///
    /// A missing file is normal; an unreadable or corrupt one is reported on
    /// stderr and replaced by defaults so the program can still log.
    pub fn load() -> Self {
        match Self::default_path() {
            Ok(path) if path.exists() => match Self::load_from(&path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Failed to load logger config {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Ok(_) => Self::default(),
            Err(e) => {
                eprintln!("Failed to get config path: {}", e);
                Self::default()
            }
        }
    }

    /// Write pretty TOML to `path`, creating parent directories
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| LoggerError::io(parent, e))?;
            }
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| LoggerError::Config(e.to_string()))?;
        fs::write(path, content).map_err(|e| LoggerError::io(path, e))
    }

    /// Save to the platform config location
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::default_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// `<platform config dir>/swarmlog/config.toml`
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| LoggerError::Config("could not find config directory".to_string()))?;
        Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }
}
