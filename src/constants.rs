//! # Logger Constants
//!
//! This module contains the defaults shared by the logger, the configuration
//! layer and the command line front end. Keeping them in one place ensures a
//! logger opened from code and one opened from a config file behave the same.

use crate::priority::Priority;
use std::time::Duration;

/// Name given to the process-wide logger
pub const DEFAULT_LOGGER_NAME: &str = "SwarmLogger";

/// Default line pattern: hour-minute-second.millisecond, a tab, then the text
pub const DEFAULT_FORMAT: &str = "%h-%M-%S.%i\t%t";

/// Default severity threshold
pub const DEFAULT_PRIORITY: Priority = Priority::Information;

/// Number of rotated archives to keep (0 keeps all of them)
pub const DEFAULT_PURGE_COUNT: u32 = 0;

/// Log rotation is off unless a caller asks for it explicitly
pub const DEFAULT_ROTATION_ENABLED: bool = false;

/// Seconds between two checks that the log file still exists
pub const DEFAULT_VERIFY_TTL_SECONDS: u64 = 5;

/// Same TTL as a `Duration`
pub const DEFAULT_VERIFY_TTL: Duration = Duration::from_secs(DEFAULT_VERIFY_TTL_SECONDS);

/// File verification runs before each emitted record by default
pub const DEFAULT_VERIFICATION_ENABLED: bool = true;

/// Log file used when a configuration does not name one
pub const DEFAULT_LOG_FILE: &str = "swarm.log";

/// Directory name under the platform config dir
pub const CONFIG_DIR_NAME: &str = "swarmlog";

/// Config file name inside `CONFIG_DIR_NAME`
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Extension appended to compressed rotation archives
pub const ARCHIVE_EXTENSION: &str = "gz";

/// chrono format used to name rotation archives (`<path>.<stamp>`)
pub const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S%3f";
