//! Audit logger use case.
//!
//! A single background writer task owns the sinks and appends records in
//! the order they were submitted. Callers either fire and forget
//! ([`AuditLogger::submit`]) or wait for the acknowledgement
//! ([`AuditLogger::record`]).
//!
//! When the primary sink fails, the record goes to the secondary sink on a
//! best-effort basis and the failure is counted. Nothing here ever reaches
//! the user.

use crate::ports::audit_sink::{AuditRecord, AuditSink, LoggingFailure};
use haven_domain::{SessionId, Turn};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

/// Acknowledgement that a turn reached the primary sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub session_id: SessionId,
    pub sequence: u64,
}

enum Command {
    Append {
        record: Box<AuditRecord>,
        reply: Option<oneshot::Sender<Result<Ack, LoggingFailure>>>,
    },
    Flush(oneshot::Sender<()>),
}

#[derive(Clone)]
pub struct AuditLogger {
    tx: mpsc::UnboundedSender<Command>,
    failures: Arc<AtomicU64>,
}

impl AuditLogger {
    /// Start the writer task. Must be called inside a Tokio runtime.
    pub fn spawn(primary: Arc<dyn AuditSink>, secondary: Arc<dyn AuditSink>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let failures = Arc::new(AtomicU64::new(0));
        tokio::spawn(writer_loop(rx, primary, secondary, failures.clone()));
        Self { tx, failures }
    }

    /// Queue a turn without waiting for it to be written.
    pub fn submit(&self, turn: &Turn) {
        let command = Command::Append {
            record: Box::new(AuditRecord::new(turn.clone())),
            reply: None,
        };
        if self.tx.send(command).is_err() {
            self.failures.fetch_add(1, Ordering::Relaxed);
            error!(
                session = %turn.session_id(),
                seq = turn.sequence(),
                "Audit writer stopped; turn not recorded"
            );
        }
    }

    /// Queue a turn and wait until the writer has handled it.
    pub async fn record(&self, turn: &Turn) -> Result<Ack, LoggingFailure> {
        let (reply, rx) = oneshot::channel();
        let command = Command::Append {
            record: Box::new(AuditRecord::new(turn.clone())),
            reply: Some(reply),
        };
        if self.tx.send(command).is_err() {
            self.failures.fetch_add(1, Ordering::Relaxed);
            return Err(LoggingFailure::WriterClosed);
        }
        rx.await.unwrap_or(Err(LoggingFailure::WriterClosed))
    }

    /// Wait until every record queued before this call has been handled.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(Command::Flush(tx)).is_ok() {
            let _ = rx.await;
        }
    }

    /// Number of records that could not be written to the primary sink.
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

async fn writer_loop(
    mut rx: mpsc::UnboundedReceiver<Command>,
    primary: Arc<dyn AuditSink>,
    secondary: Arc<dyn AuditSink>,
    failures: Arc<AtomicU64>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Append { record, reply } => {
                let result = write_one(&record, primary.as_ref(), secondary.as_ref(), &failures);
                if let Some(reply) = reply {
                    let _ = reply.send(result);
                }
            }
            Command::Flush(done) => {
                if let Err(e) = primary.flush() {
                    warn!("Audit flush failed: {}", e);
                }
                let _ = done.send(());
            }
        }
    }
    debug!("Audit writer stopped");
}

fn write_one(
    record: &AuditRecord,
    primary: &dyn AuditSink,
    secondary: &dyn AuditSink,
    failures: &AtomicU64,
) -> Result<Ack, LoggingFailure> {
    let ack = Ack {
        session_id: record.turn.session_id().clone(),
        sequence: record.turn.sequence(),
    };
    match primary.append(record) {
        Ok(()) => Ok(ack),
        Err(e) => {
            let total = failures.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(
                session = %ack.session_id,
                seq = ack.sequence,
                failures = total,
                "Primary audit sink failed: {}",
                e
            );
            if let Err(secondary_err) = secondary.append(record) {
                error!(
                    session = %ack.session_id,
                    seq = ack.sequence,
                    "Secondary audit sink failed too: {}",
                    secondary_err
                );
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FailingSink, MemorySink};
    use haven_domain::{GuardVerdict, Topic, TurnBuilder};

    fn turn(seq: u64) -> Turn {
        TurnBuilder::new(SessionId::new("s1"), seq, "joke")
            .refused(GuardVerdict::out_of_scope(Topic::Unrelated), "no")
    }

    #[tokio::test]
    async fn test_records_in_submission_order() {
        let primary = Arc::new(MemorySink::default());
        let logger = AuditLogger::spawn(primary.clone(), Arc::new(MemorySink::default()));

        for seq in 1..=5 {
            logger.submit(&turn(seq));
        }
        logger.flush().await;

        let seqs: Vec<u64> = primary.all().iter().map(|r| r.turn.sequence()).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4, 5]);
        assert_eq!(logger.failure_count(), 0);
    }

    #[tokio::test]
    async fn test_record_acknowledges() {
        let primary = Arc::new(MemorySink::default());
        let logger = AuditLogger::spawn(primary.clone(), Arc::new(MemorySink::default()));
        let ack = logger.record(&turn(7)).await.unwrap();
        assert_eq!(ack.sequence, 7);
        assert_eq!(ack.session_id.as_str(), "s1");
        assert_eq!(primary.len(), 1);
    }

    #[tokio::test]
    async fn test_primary_failure_goes_to_secondary_and_is_counted() {
        let secondary = Arc::new(MemorySink::default());
        let logger = AuditLogger::spawn(Arc::new(FailingSink), secondary.clone());

        let result = logger.record(&turn(1)).await;
        assert!(matches!(result, Err(LoggingFailure::Io(_))));
        logger.submit(&turn(2));
        logger.flush().await;

        assert_eq!(logger.failure_count(), 2);
        assert_eq!(secondary.len(), 2);
    }
}
