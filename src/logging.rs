//! Log sinks for sampler diagnostics and periodic summaries.
//!
//! A sink is constructed once at startup and handed to the sampler and the
//! display loop. Every record is also forwarded to `tracing`, so console output
//! follows the subscriber installed by the binary.

use crate::error::Result;
use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};
use tracing::Level;

/// Destination for diagnostic and summary records.
pub trait LogSink {
    /// Append one record.
    fn record(&mut self, level: Level, message: &str);

    /// Push buffered records to their destination.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

fn forward(level: Level, message: &str) {
    match level {
        Level::ERROR => tracing::error!("{}", message),
        Level::WARN => tracing::warn!("{}", message),
        Level::INFO => tracing::info!("{}", message),
        Level::DEBUG => tracing::debug!("{}", message),
        Level::TRACE => tracing::trace!("{}", message),
    }
}

/// Append-only text file, one timestamp-prefixed line per record.
pub struct FileLog {
    path: PathBuf,
    writer: LineWriter<File>,
    min_level: Level,
}

impl FileLog {
    /// Open `path` for appending, creating it if needed.
    ///
    /// Records more verbose than `min_level` are not written to the file.
    pub fn open(path: impl AsRef<Path>, min_level: Level) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: LineWriter::new(file),
            min_level,
        })
    }
}

impl LogSink for FileLog {
    fn record(&mut self, level: Level, message: &str) {
        forward(level, message);
        if level > self.min_level {
            return;
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S,%3f");
        if let Err(e) = writeln!(self.writer, "{} {:<5} {}", timestamp, level, message) {
            tracing::error!("Failed to write to {}: {}", self.path.display(), e);
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        Ok(())
    }
}

impl Drop for FileLog {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Sink that only forwards to `tracing`.
#[derive(Debug, Default)]
pub struct ConsoleLog;

impl LogSink for ConsoleLog {
    fn record(&mut self, level: Level, message: &str) {
        forward(level, message);
    }
}

/// In-memory sink that keeps every record, handy for inspecting diagnostics.
#[derive(Debug, Default)]
pub struct MemoryLog {
    records: Vec<(Level, String)>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[(Level, String)] {
        &self.records
    }

    /// Number of records at exactly `level`.
    pub fn count(&self, level: Level) -> usize {
        self.records.iter().filter(|(l, _)| *l == level).count()
    }

    /// Whether any record contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.records.iter().any(|(_, m)| m.contains(needle))
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl LogSink for MemoryLog {
    fn record(&mut self, level: Level, message: &str) {
        self.records.push((level, message.to_string()));
    }
}
