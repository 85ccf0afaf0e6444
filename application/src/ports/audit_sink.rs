//! Port for the durable audit trail.
//!
//! Defines the [`AuditSink`] trait for appending one [`AuditRecord`] per
//! turn to an append-only store.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the full
//! turn (verdicts, tool records, provider, final text) in a machine-readable
//! format (JSONL).

use chrono::{DateTime, Utc};
use haven_domain::Turn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to durably record a turn. Never shown to the user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoggingFailure {
    #[error("Audit I/O error: {0}")]
    Io(String),

    #[error("Audit serialization error: {0}")]
    Serialization(String),

    #[error("Audit writer stopped")]
    WriterClosed,
}

/// One line of the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub logged_at: DateTime<Utc>,
    #[serde(flatten)]
    pub turn: Turn,
}

impl AuditRecord {
    pub fn new(turn: Turn) -> Self {
        Self {
            logged_at: Utc::now(),
            turn,
        }
    }
}

/// Append-only store for audit records.
///
/// `append` is synchronous: the audit logger calls it from its single
/// writer task, so implementations never see concurrent appends from it.
pub trait AuditSink: Send + Sync {
    fn append(&self, record: &AuditRecord) -> Result<(), LoggingFailure>;

    fn flush(&self) -> Result<(), LoggingFailure> {
        Ok(())
    }
}

/// No-op sink for tests and when auditing is disabled.
pub struct NoAuditSink;

impl AuditSink for NoAuditSink {
    fn append(&self, _record: &AuditRecord) -> Result<(), LoggingFailure> {
        Ok(())
    }
}
