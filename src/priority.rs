//! # Severity Levels
//!
//! Eight ordered severities, most severe first. A logger configured with a
//! threshold emits every record whose priority is at least as severe as the
//! threshold and suppresses everything below it.
//!
//! The numeric values (1 = FATAL .. 8 = TRACE) match the classic syslog-like
//! numbering used by POCO-style loggers, so configuration files may use either
//! names or numbers.

use crate::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Record severity. Lower ordinal means more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// The process cannot continue
    Fatal = 1,
    /// A critical failure, usually needing operator attention
    Critical = 2,
    /// An operation failed
    Error = 3,
    /// Something unexpected that was recovered from
    Warning = 4,
    /// Normal but significant condition
    Notice = 5,
    /// Informational message
    Information = 6,
    /// Developer oriented detail
    Debug = 7,
    /// Very fine grained tracing
    Trace = 8,
}

impl Priority {
    /// All levels, most severe first
    pub const ALL: [Priority; 8] = [
        Priority::Fatal,
        Priority::Critical,
        Priority::Error,
        Priority::Warning,
        Priority::Notice,
        Priority::Information,
        Priority::Debug,
        Priority::Trace,
    ];

    /// Numeric value, 1 (fatal) through 8 (trace)
    pub fn value(self) -> u8 {
        self as u8
    }

    /// True when `self` is at least as severe as `threshold`
    pub fn passes(self, threshold: Priority) -> bool {
        self <= threshold
    }

    /// Upper-case name as written by `%p`
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Fatal => "FATAL",
            Priority::Critical => "CRITICAL",
            Priority::Error => "ERROR",
            Priority::Warning => "WARNING",
            Priority::Notice => "NOTICE",
            Priority::Information => "INFORMATION",
            Priority::Debug => "DEBUG",
            Priority::Trace => "TRACE",
        }
    }

    /// Single character as written by `%q`
    pub fn abbreviation(self) -> char {
        match self {
            Priority::Fatal => 'F',
            Priority::Critical => 'C',
            Priority::Error => 'E',
            Priority::Warning => 'W',
            Priority::Notice => 'N',
            Priority::Information => 'I',
            Priority::Debug => 'D',
            Priority::Trace => 'T',
        }
    }

    /// Closest `tracing` level, used when mirroring records into diagnostics
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Priority::Fatal | Priority::Critical | Priority::Error => tracing::Level::ERROR,
            Priority::Warning => tracing::Level::WARN,
            Priority::Notice | Priority::Information => tracing::Level::INFO,
            Priority::Debug => tracing::Level::DEBUG,
            Priority::Trace => tracing::Level::TRACE,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        crate::constants::DEFAULT_PRIORITY
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let priority = match s.trim().to_ascii_lowercase().as_str() {
            "fatal" | "1" => Priority::Fatal,
            "critical" | "crit" | "2" => Priority::Critical,
            "error" | "err" | "3" => Priority::Error,
            "warning" | "warn" | "4" => Priority::Warning,
            "notice" | "5" => Priority::Notice,
            "information" | "info" | "6" => Priority::Information,
            "debug" | "7" => Priority::Debug,
            "trace" | "8" => Priority::Trace,
            _ => return Err(LoggerError::InvalidPriority(s.to_string())),
        };
        Ok(priority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_most_severe_first() {
        for pair in Priority::ALL.windows(2) {
            assert!(pair[0] < pair[1], "{} should sort before {}", pair[0], pair[1]);
        }
        assert_eq!(Priority::Fatal.value(), 1);
        assert_eq!(Priority::Trace.value(), 8);
    }

    #[test]
    fn test_passes_threshold() {
        assert!(Priority::Error.passes(Priority::Warning));
        assert!(Priority::Warning.passes(Priority::Warning));
        assert!(!Priority::Notice.passes(Priority::Warning));
        assert!(!Priority::Trace.passes(Priority::Debug));
        assert!(Priority::Fatal.passes(Priority::Fatal));
    }

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("INFO".parse::<Priority>().unwrap(), Priority::Information);
        assert_eq!("warn".parse::<Priority>().unwrap(), Priority::Warning);
        assert_eq!(" Critical ".parse::<Priority>().unwrap(), Priority::Critical);
        assert_eq!("8".parse::<Priority>().unwrap(), Priority::Trace);
        assert!(matches!(
            "verbose".parse::<Priority>(),
            Err(LoggerError::InvalidPriority(_))
        ));
    }

    #[test]
    fn test_display_and_abbreviation() {
        assert_eq!(Priority::Notice.to_string(), "NOTICE");
        assert_eq!(Priority::Information.abbreviation(), 'I');
        assert_eq!(Priority::default(), Priority::Information);
    }

    #[test]
    fn test_tracing_level_mapping() {
        assert_eq!(Priority::Critical.to_tracing_level(), tracing::Level::ERROR);
        assert_eq!(Priority::Notice.to_tracing_level(), tracing::Level::INFO);
        assert_eq!(Priority::Trace.to_tracing_level(), tracing::Level::TRACE);
    }

    #[test]
    fn test_serde_lowercase_names() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            priority: Priority,
        }
        let text = toml::to_string(&Wrapper { priority: Priority::Debug }).unwrap();
        assert!(text.contains("\"debug\""));
        let back: Wrapper = toml::from_str("priority = \"warning\"").unwrap();
        assert_eq!(back.priority, Priority::Warning);
    }
}
