//! Logging infrastructure: the durable audit trail.
//!
//! Provides [`JsonlAuditSink`], an append-only JSONL file writer that
//! implements the [`AuditSink`](haven_application::AuditSink) port. The
//! same type backs both the primary and the secondary audit files.

mod jsonl_sink;

pub use jsonl_sink::JsonlAuditSink;
