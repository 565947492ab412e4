//! # Pattern Formatter
//!
//! Turns a record into one line of text following a `%`-pattern such as
//! `"%Y-%m-%d %H:%M:%S.%i [%p] %t"`. The pattern is parsed once when the
//! logger opens, so a bad pattern fails `open` instead of every write.
//!
//! ## Supported specifiers
//!
//! | Spec | Output |
//! |------|--------|
//! | `%s` | logger name |
//! | `%t` | message text |
//! | `%p` / `%q` | priority name / single letter |
//! | `%P` / `%I` / `%T` | process id / numeric thread id / thread name |
//! | `%Y` `%y` `%m` `%d` | year, 2-digit year, month, day |
//! | `%H` `%h` `%A` | hour 00-23, hour 01-12, AM/PM |
//! | `%M` `%S` | minute, second |
//! | `%i` `%c` `%F` | milliseconds, centiseconds, microseconds |
//! | `%%` | a literal `%` |
//!
//! Timestamps are rendered in UTC.

use crate::error::{LoggerError, Result};
use crate::priority::Priority;
use chrono::{DateTime, Datelike, Timelike, Utc};
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Source,
    Text,
    PriorityName,
    PriorityLetter,
    ProcessId,
    ThreadId,
    ThreadName,
    Year4,
    Year2,
    Month,
    Day,
    Hour24,
    Hour12,
    AmPm,
    Minute,
    Second,
    Millis,
    Centis,
    Micros,
}

/// A single log record ready to be formatted
#[derive(Debug, Clone)]
pub struct Record<'a> {
    pub source: &'a str,
    pub priority: Priority,
    pub text: &'a str,
    pub time: DateTime<Utc>,
}

impl<'a> Record<'a> {
    /// Record stamped with the current time
    pub fn now(source: &'a str, priority: Priority, text: &'a str) -> Self {
        Self {
            source,
            priority,
            text,
            time: Utc::now(),
        }
    }
}

/// Pre-parsed line pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternFormatter {
    pattern: String,
    segments: Vec<Segment>,
}

impl PatternFormatter {
    /// Parse `pattern`, rejecting unknown specifiers and a dangling `%`
    pub fn new(pattern: &str) -> Result<Self> {
        let invalid = |reason: String| LoggerError::InvalidFormat {
            pattern: pattern.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            let spec = chars
                .next()
                .ok_or_else(|| invalid("pattern ends with a lone '%'".to_string()))?;
            let segment = match spec {
                '%' => {
                    literal.push('%');
                    continue;
                }
                's' => Segment::Source,
                't' => Segment::Text,
                'p' => Segment::PriorityName,
                'q' => Segment::PriorityLetter,
                'P' => Segment::ProcessId,
                'I' => Segment::ThreadId,
                'T' => Segment::ThreadName,
                'Y' => Segment::Year4,
                'y' => Segment::Year2,
                'm' => Segment::Month,
                'd' => Segment::Day,
                'H' => Segment::Hour24,
                'h' => Segment::Hour12,
                'A' => Segment::AmPm,
                'M' => Segment::Minute,
                'S' => Segment::Second,
                'i' => Segment::Millis,
                'c' => Segment::Centis,
                'F' => Segment::Micros,
                other => return Err(invalid(format!("unknown specifier '%{}'", other))),
            };
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(segment);
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
        })
    }

    /// The pattern this formatter was built from
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Render `record` without a trailing newline
    pub fn format(&self, record: &Record<'_>) -> String {
        let mut out = String::with_capacity(self.pattern.len() + record.text.len() + 16);
        let t = &record.time;
        // Writing to a String cannot fail
        for segment in &self.segments {
            let _ = match segment {
                Segment::Literal(s) => out.write_str(s),
                Segment::Source => out.write_str(record.source),
                Segment::Text => out.write_str(record.text),
                Segment::PriorityName => out.write_str(record.priority.as_str()),
                Segment::PriorityLetter => out.write_char(record.priority.abbreviation()),
                Segment::ProcessId => write!(out, "{}", std::process::id()),
                Segment::ThreadId => out.write_str(&thread_number()),
                Segment::ThreadName => {
                    out.write_str(std::thread::current().name().unwrap_or("unnamed"))
                }
                Segment::Year4 => write!(out, "{:04}", t.year()),
                Segment::Year2 => write!(out, "{:02}", t.year().rem_euclid(100)),
                Segment::Month => write!(out, "{:02}", t.month()),
                Segment::Day => write!(out, "{:02}", t.day()),
                Segment::Hour24 => write!(out, "{:02}", t.hour()),
                Segment::Hour12 => write!(out, "{:02}", t.hour12().1),
                Segment::AmPm => out.write_str(if t.hour12().0 { "PM" } else { "AM" }),
                Segment::Minute => write!(out, "{:02}", t.minute()),
                Segment::Second => write!(out, "{:02}", t.second()),
                Segment::Millis => write!(out, "{:03}", subsec_nanos(t) / 1_000_000),
                Segment::Centis => write!(out, "{:02}", subsec_nanos(t) / 10_000_000),
                Segment::Micros => write!(out, "{:06}", subsec_nanos(t) / 1_000),
            };
        }
        out
    }
}

// Leap seconds are reported by chrono as nanos >= 1e9
fn subsec_nanos(t: &DateTime<Utc>) -> u32 {
    t.nanosecond() % 1_000_000_000
}

/// Numeric part of the current thread's id (`ThreadId(3)` renders as `3`)
fn thread_number() -> String {
    let id = format!("{:?}", std::thread::current().id());
    id.trim_start_matches("ThreadId(").trim_end_matches(')').to_string()
}
