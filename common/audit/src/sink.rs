use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::model::{AuditEntry, AuditResult, NewAuditEntry};

/// Durable destination for audit entries. The sink assigns `id` and `created_at`.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, entry: &NewAuditEntry) -> AuditResult<AuditEntry>;
}

/// Process-local sink for tests and development.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn append(&self, entry: &NewAuditEntry) -> AuditResult<AuditEntry> {
        let mut entries = self.entries.lock().await;
        let now = Utc::now();
        // timestamps never go backwards even if the wall clock does
        let created_at = match entries.last() {
            Some(last) if last.created_at > now => last.created_at,
            _ => now,
        };
        let stored = AuditEntry {
            id: entries.len() as i64 + 1,
            user_id: entry.user_id,
            action: entry.action.clone(),
            details: entry.details.clone(),
            created_at,
        };
        entries.push(stored.clone());
        Ok(stored)
    }
}
