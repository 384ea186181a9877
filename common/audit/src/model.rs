use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An audit record before the store has assigned `id` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewAuditEntry {
    pub user_id: Option<i64>,
    pub action: String,
    pub details: serde_json::Value,
}

impl NewAuditEntry {
    pub fn new(user_id: Option<i64>, action: impl Into<String>, details: serde_json::Value) -> Self {
        Self {
            user_id,
            action: action.into(),
            details,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    pub id: i64,
    pub user_id: Option<i64>,
    pub action: String,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit store error: {0}")]
    Store(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("audit store unavailable")]
    Unavailable,
}

pub type AuditResult<T> = Result<T, AuditError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    QueueFull,
    Closed,
}

/// Reported on the recorder's failure channel whenever an entry is not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditFailure {
    Dropped { action: String, reason: DropReason },
    Sink { action: String, error: String },
}

impl AuditFailure {
    /// Metric label for the failure.
    pub fn kind(&self) -> &'static str {
        match self {
            AuditFailure::Dropped { reason: DropReason::QueueFull, .. } => "queue_full",
            AuditFailure::Dropped { reason: DropReason::Closed, .. } => "closed",
            AuditFailure::Sink { .. } => "sink",
        }
    }

    pub fn action(&self) -> &str {
        match self {
            AuditFailure::Dropped { action, .. } | AuditFailure::Sink { action, .. } => action,
        }
    }
}
