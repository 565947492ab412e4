//! # Log Sinks
//!
//! A sink owns the destination of formatted records. The logger holds exactly
//! one sink while it is open and drops it on close, so there is no registry
//! of named sinks to look things up in.
//!
//! [`FileSink`] appends to a single file and, when rotation is enabled, rolls
//! the file over once per UTC day. A rolled file is renamed to
//! `<path>.<timestamp>`, gzip-compressed to `<path>.<timestamp>.gz`, and the
//! oldest archives beyond the purge count are deleted.
//!
//! ## Design Goals
//!
//! - **Synchronous and in order**: every record is written and flushed before
//!   `write` returns, so a crash never loses acknowledged records
//! - **Rotation never loses records**: if rolling over fails, the record still
//!   goes to the current file and the failure is reported through `tracing`
//! - **Archives sort by age**: fixed-width timestamps make name order equal to
//!   creation order, which is what purging relies on

use crate::constants::{ARCHIVE_EXTENSION, ARCHIVE_TIMESTAMP_FORMAT};
use crate::error::{LoggerError, Result};
use crate::format::{PatternFormatter, Record};
use crate::priority::Priority;
use chrono::{NaiveDate, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Daily rotation settings for a file sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RotationPolicy {
    /// Roll the file over at the first write of each new UTC day
    pub enabled: bool,
    /// Compressed archives to keep; 0 keeps every archive
    pub purge_count: u32,
}

impl RotationPolicy {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn daily(purge_count: u32) -> Self {
        Self {
            enabled: true,
            purge_count,
        }
    }
}

/// Everything needed to build a sink
#[derive(Debug, Clone)]
pub struct SinkSpec {
    /// Name written by `%s`
    pub source: String,
    pub path: PathBuf,
    pub formatter: PatternFormatter,
    pub level: Priority,
    pub rotation: RotationPolicy,
}

/// Destination for formatted records
pub trait Sink: Send {
    /// Write one record if `priority` passes the sink's own level
    fn write(&mut self, priority: Priority, message: &str) -> Result<()>;

    /// Change the sink's threshold
    fn set_level(&mut self, level: Priority);

    fn level(&self) -> Priority;

    fn flush(&mut self) -> Result<()>;
}

/// Builds sinks for a logger on open and on every reopen
pub trait SinkFactory: Send + Sync {
    fn create(&self, spec: &SinkSpec) -> Result<Box<dyn Sink>>;
}

/// Factory producing [`FileSink`]s
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSinkFactory;

impl SinkFactory for FileSinkFactory {
    fn create(&self, spec: &SinkSpec) -> Result<Box<dyn Sink>> {
        Ok(Box::new(FileSink::open(spec)?))
    }
}

/// Append-only file sink with optional daily rotation
#[derive(Debug)]
pub struct FileSink {
    /// Session name written by `%s`
    source: String,
    /// Live file location; archives are derived from it
    path: PathBuf,
    /// Append-mode handle; replaced on rotation
    file: File,
    formatter: PatternFormatter,
    /// Records less severe than this are skipped
    level: Priority,
    rotation: RotationPolicy,
    /// UTC day the current file was started on
    opened_on: NaiveDate,
}

impl FileSink {
    /// Open (or create) the file at `spec.path` in append mode
    pub fn open(spec: &SinkSpec) -> Result<Self> {
        let file = open_append(&spec.path)?;
        Ok(Self {
            source: spec.source.clone(),
            path: spec.path.clone(),
            file,
            formatter: spec.formatter.clone(),
            level: spec.level,
            rotation: spec.rotation,
            opened_on: Utc::now().date_naive(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rotation(&self) -> RotationPolicy {
        self.rotation
    }

    /// Roll the current file into a compressed archive and start a new one
    pub fn rotate(&mut self) -> Result<()> {
        self.file.flush().map_err(|e| LoggerError::io(&self.path, e))?;

        let stamp = Utc::now().format(ARCHIVE_TIMESTAMP_FORMAT).to_string();
        let archive = archive_path(&self.path, &stamp);
        // Rename first so the live path is free; the open handle keeps
        // pointing at the archive until it is replaced below.
        fs::rename(&self.path, &archive).map_err(|e| LoggerError::io(&archive, e))?;
        self.file = open_append(&self.path)?;
        self.opened_on = Utc::now().date_naive();

        let compressed = compress(&archive)?;
        debug!(archive = %compressed.display(), "rotated log file");

        if self.rotation.purge_count > 0 {
            purge_archives(&self.path, self.rotation.purge_count as usize)?;
        }
        Ok(())
    }

    /// Rotate when enabled and the UTC date moved past the day the file started
    fn rotate_if_due(&mut self) -> Result<()> {
        if self.rotation.enabled && Utc::now().date_naive() != self.opened_on {
            self.rotate()?;
        }
        Ok(())
    }
}

impl Sink for FileSink {
    fn write(&mut self, priority: Priority, message: &str) -> Result<()> {
        if !priority.passes(self.level) {
            return Ok(());
        }
        if let Err(e) = self.rotate_if_due() {
            // Keep writing to the current file rather than losing the record
            warn!(error = %e, "log rotation failed");
        }

        let mut line = self.formatter.format(&Record::now(&self.source, priority, message));
        line.push('\n');
        self.file
            .write_all(line.as_bytes())
            .and_then(|_| self.file.flush())
            .map_err(|e| LoggerError::io(&self.path, e))
    }

    fn set_level(&mut self, level: Priority) {
        self.level = level;
    }

    fn level(&self) -> Priority {
        self.level
    }

    fn flush(&mut self) -> Result<()> {
        self.file.flush().map_err(|e| LoggerError::io(&self.path, e))
    }
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| LoggerError::io(path, e))
}

fn archive_path(path: &Path, stamp: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(stamp);
    PathBuf::from(name)
}

/// Gzip `archive` into `archive.gz` and remove the uncompressed copy
fn compress(archive: &Path) -> Result<PathBuf> {
    let mut target = archive.as_os_str().to_os_string();
    target.push(".");
    target.push(ARCHIVE_EXTENSION);
    let target = PathBuf::from(target);

    let input = File::open(archive).map_err(|e| LoggerError::io(archive, e))?;
    let output = File::create(&target).map_err(|e| LoggerError::io(&target, e))?;
    let mut encoder = GzEncoder::new(output, Compression::default());
    io::copy(&mut BufReader::new(input), &mut encoder)
        .and_then(|_| encoder.finish())
        .map_err(|e| LoggerError::io(&target, e))?;

    fs::remove_file(archive).map_err(|e| LoggerError::io(archive, e))?;
    Ok(target)
}

/// Compressed archives of `path`, oldest first
pub fn list_archives(path: &Path) -> Result<Vec<PathBuf>> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let Some(base) = path.file_name().and_then(|n| n.to_str()) else {
        return Ok(Vec::new());
    };
    let prefix = format!("{}.", base);
    let suffix = format!(".{}", ARCHIVE_EXTENSION);

    let mut archives: Vec<PathBuf> = fs::read_dir(&dir)
        .map_err(|e| LoggerError::io(&dir, e))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .map(|n| n.starts_with(&prefix) && n.ends_with(&suffix))
                .unwrap_or(false)
        })
        .map(|entry| entry.path())
        .collect();
    // Timestamps are fixed width, so name order is age order
    archives.sort();
    Ok(archives)
}

fn purge_archives(path: &Path, keep: usize) -> Result<()> {
    let archives = list_archives(path)?;
    let excess = archives.len().saturating_sub(keep);
    for old in archives.into_iter().take(excess) {
        fs::remove_file(&old).map_err(|e| LoggerError::io(&old, e))?;
        debug!(archive = %old.display(), "purged log archive");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::TempDir;

    fn spec(path: PathBuf, level: Priority, rotation: RotationPolicy) -> SinkSpec {
        SinkSpec {
            source: "test-1".to_string(),
            path,
            formatter: PatternFormatter::new("%q %t").unwrap(),
            level,
            rotation,
        }
    }

    #[test]
    fn test_writes_formatted_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.log");
        let mut sink = FileSink::open(&spec(path.clone(), Priority::Information, RotationPolicy::disabled())).unwrap();

        sink.write(Priority::Error, "first").unwrap();
        sink.write(Priority::Information, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "E first\nI second\n");
    }

    #[test]
    fn test_level_filters_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("b.log");
        let mut sink = FileSink::open(&spec(path.clone(), Priority::Warning, RotationPolicy::disabled())).unwrap();

        sink.write(Priority::Debug, "hidden").unwrap();
        sink.set_level(Priority::Debug);
        assert_eq!(sink.level(), Priority::Debug);
        sink.write(Priority::Debug, "shown").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "D shown\n");
    }

    #[test]
    fn test_appends_to_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("c.log");
        fs::write(&path, "old\n").unwrap();

        let mut sink = FileSink::open(&spec(path.clone(), Priority::Trace, RotationPolicy::disabled())).unwrap();
        sink.write(Priority::Notice, "new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "old\nN new\n");
    }

    #[test]
    fn test_open_fails_for_missing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no-such-dir").join("d.log");
        let err = FileSink::open(&spec(path, Priority::Trace, RotationPolicy::disabled())).unwrap_err();
        assert!(matches!(err, LoggerError::Io { .. }));
    }

    #[test]
    fn test_rotate_compresses_archive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("e.log");
        let mut sink = FileSink::open(&spec(path.clone(), Priority::Trace, RotationPolicy::daily(0))).unwrap();
        sink.write(Priority::Warning, "before rotation").unwrap();

        sink.rotate().unwrap();
        sink.write(Priority::Warning, "after rotation").unwrap();

        let archives = list_archives(&path).unwrap();
        assert_eq!(archives.len(), 1);
        let mut text = String::new();
        GzDecoder::new(File::open(&archives[0]).unwrap())
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "W before rotation\n");
        assert_eq!(fs::read_to_string(&path).unwrap(), "W after rotation\n");
    }

    #[test]
    fn test_write_on_new_day_rolls_file_over() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("daily.log");
        let mut sink = FileSink::open(&spec(path.clone(), Priority::Trace, RotationPolicy::daily(0))).unwrap();
        sink.write(Priority::Notice, "yesterday").unwrap();
        assert!(list_archives(&path).unwrap().is_empty());

        sink.opened_on = Utc::now().date_naive().pred_opt().unwrap();
        sink.write(Priority::Notice, "today").unwrap();

        assert_eq!(list_archives(&path).unwrap().len(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "N today\n");
        assert_eq!(sink.opened_on, Utc::now().date_naive());

        // same day again: no second archive
        sink.write(Priority::Notice, "later today").unwrap();
        assert_eq!(list_archives(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_disabled_rotation_ignores_date_change() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("static.log");
        let mut sink = FileSink::open(&spec(path.clone(), Priority::Trace, RotationPolicy::disabled())).unwrap();
        sink.write(Priority::Notice, "one").unwrap();

        sink.opened_on = Utc::now().date_naive().pred_opt().unwrap();
        sink.write(Priority::Notice, "two").unwrap();

        assert!(list_archives(&path).unwrap().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "N one\nN two\n");
    }

    #[test]
    fn test_purge_keeps_newest_archives() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f.log");
        for stamp in ["20240101000000000", "20240102000000000", "20240103000000000"] {
            fs::write(archive_path(&path, &format!("{}.gz", stamp)), b"x").unwrap();
        }
        let mut sink = FileSink::open(&spec(path.clone(), Priority::Trace, RotationPolicy::daily(2))).unwrap();
        sink.write(Priority::Error, "x").unwrap();

        sink.rotate().unwrap();

        let names: Vec<String> = list_archives(&path)
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names[0].starts_with("f.log.20240103"));
        assert!(!names.iter().any(|n| n.contains("20240101") || n.contains("20240102")));
    }

    #[test]
    fn test_factory_builds_file_sink() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("g.log");
        let mut sink = FileSinkFactory
            .create(&spec(path.clone(), Priority::Information, RotationPolicy::disabled()))
            .unwrap();
        sink.write(Priority::Information, "via factory").unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("via factory"));
    }
}
