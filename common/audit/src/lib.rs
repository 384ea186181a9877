pub mod client;
pub mod model;
pub mod recorder;
pub mod sink;

pub use client::client_ip_from_headers;
pub use model::{AuditEntry, AuditError, AuditFailure, AuditResult, DropReason, NewAuditEntry};
pub use recorder::{AuditRecorder, DEFAULT_QUEUE_CAPACITY};
pub use sink::{AuditSink, MemoryAuditSink};
