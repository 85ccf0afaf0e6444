//! JSONL file writer for audit records.
//!
//! Each [`AuditRecord`] is serialized as a single JSON line and appended to
//! the file. Existing content is never rewritten.

use haven_application::{AuditRecord, AuditSink, LoggingFailure};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Append-only JSONL audit sink.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Every record is flushed before
/// `append` returns; flushes again on `Drop`.
pub struct JsonlAuditSink {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlAuditSink {
    /// Open (or create) the file at `path` in append mode.
    ///
    /// Creates parent directories if they don't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoggingFailure> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                LoggingFailure::Io(format!(
                    "cannot create audit directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggingFailure::Io(format!("cannot open audit file {}: {}", path.display(), e))
            })?;
        debug!("Audit sink opened at {}", path.display());

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the audit file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for JsonlAuditSink {
    fn append(&self, record: &AuditRecord) -> Result<(), LoggingFailure> {
        let line = serde_json::to_string(record)
            .map_err(|e| LoggingFailure::Serialization(e.to_string()))?;

        let mut writer = self.writer.lock().map_err(|_| LoggingFailure::WriterClosed)?;
        writeln!(writer, "{}", line).map_err(|e| LoggingFailure::Io(e.to_string()))?;
        // One record per line must be on disk before the turn is acknowledged
        writer.flush().map_err(|e| LoggingFailure::Io(e.to_string()))
    }

    fn flush(&self) -> Result<(), LoggingFailure> {
        let mut writer = self.writer.lock().map_err(|_| LoggingFailure::WriterClosed)?;
        writer.flush().map_err(|e| LoggingFailure::Io(e.to_string()))
    }
}

impl Drop for JsonlAuditSink {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
