use async_trait::async_trait;
use common_audit::{AuditError, AuditSink};
use thiserror::Error;

use crate::models::{
    Alert, AuditLogView, Camera, InventoryItem, ItemDraft, LevelCount, StatusCount, UserRecord,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable")]
    Unavailable,
}

impl From<StoreError> for AuditError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Unavailable => AuditError::Unavailable,
            other => AuditError::Store(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;
    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<UserRecord>>;
}

#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Every item, newest first (`created_at DESC, id DESC`).
    async fn list_items(&self) -> StoreResult<Vec<InventoryItem>>;
    async fn create_item(&self, draft: &ItemDraft) -> StoreResult<InventoryItem>;
    /// `None` when no item has `id`.
    async fn update_item(&self, id: i64, draft: &ItemDraft) -> StoreResult<Option<InventoryItem>>;
    /// Returns the removed item's name, `None` when no item has `id`.
    async fn delete_item(&self, id: i64) -> StoreResult<Option<String>>;
    async fn inventory_status_counts(&self) -> StoreResult<Vec<StatusCount>>;
}

#[async_trait]
pub trait MonitoringStore: Send + Sync {
    async fn list_cameras(&self) -> StoreResult<Vec<Camera>>;
    async fn latest_alerts(&self, limit: i64) -> StoreResult<Vec<Alert>>;
    async fn camera_status_counts(&self) -> StoreResult<Vec<StatusCount>>;
    async fn open_alert_level_counts(&self) -> StoreResult<Vec<LevelCount>>;
}

#[async_trait]
pub trait AuditLogReader: Send + Sync {
    async fn latest_audit_entries(&self, limit: i64) -> StoreResult<Vec<AuditLogView>>;
}

/// Everything the gateway reads and writes.
#[async_trait]
pub trait Store: UserStore + InventoryStore + MonitoringStore + AuditLogReader + AuditSink {
    async fn ping(&self) -> StoreResult<()>;
}
