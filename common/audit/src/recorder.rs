use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::model::{AuditFailure, DropReason, NewAuditEntry};
use crate::sink::AuditSink;

pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

enum Command {
    Append(NewAuditEntry),
    Flush(oneshot::Sender<()>),
}

/// Fire-and-forget handle onto the audit writer task.
///
/// `record` never blocks and never fails the caller; entries that cannot be persisted
/// are reported on the failure channel returned by [`AuditRecorder::spawn`].
#[derive(Clone)]
pub struct AuditRecorder {
    tx: mpsc::Sender<Command>,
    failures: mpsc::UnboundedSender<AuditFailure>,
}

impl AuditRecorder {
    /// Starts the writer task on the current tokio runtime.
    pub fn spawn(
        sink: Arc<dyn AuditSink>,
        capacity: usize,
    ) -> (Self, mpsc::UnboundedReceiver<AuditFailure>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let (failures, failure_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(sink, rx, failures.clone()));
        (Self { tx, failures }, failure_rx)
    }

    pub fn record(&self, user_id: Option<i64>, action: impl Into<String>, details: serde_json::Value) {
        let entry = NewAuditEntry::new(user_id, action, details);
        if let Err(err) = self.tx.try_send(Command::Append(entry)) {
            let (reason, entry) = match err {
                mpsc::error::TrySendError::Full(cmd) => (DropReason::QueueFull, cmd),
                mpsc::error::TrySendError::Closed(cmd) => (DropReason::Closed, cmd),
            };
            let action = match entry {
                Command::Append(entry) => entry.action,
                Command::Flush(_) => String::new(),
            };
            warn!(action = %action, reason = ?reason, "audit entry dropped");
            let _ = self.failures.send(AuditFailure::Dropped { action, reason });
        }
    }

    /// Resolves once every entry enqueued before this call has been attempted.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(done_tx)).await.is_err() {
            return;
        }
        let _ = done_rx.await;
    }
}

async fn run_writer(
    sink: Arc<dyn AuditSink>,
    mut rx: mpsc::Receiver<Command>,
    failures: mpsc::UnboundedSender<AuditFailure>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Append(entry) => match sink.append(&entry).await {
                Ok(stored) => {
                    debug!(audit_id = stored.id, action = %stored.action, "audit entry stored");
                }
                Err(err) => {
                    warn!(action = %entry.action, error = %err, "audit write failed");
                    let _ = failures.send(AuditFailure::Sink {
                        action: entry.action,
                        error: err.to_string(),
                    });
                }
            },
            Command::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("audit writer stopped");
}
