use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common_audit::{AuditEntry, AuditResult, AuditSink, NewAuditEntry};
use sqlx::{postgres::PgPoolOptions, query, query_as, query_scalar, PgPool};

use super::{AuditLogReader, InventoryStore, MonitoringStore, Store, StoreError, StoreResult, UserStore};
use crate::models::{
    Alert, AuditLogView, Camera, InventoryItem, ItemDraft, LevelCount, StatusCount, UserRecord,
};

pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(2);

const USER_COLUMNS: &str = "id, name, email, password_hash, tier";

const ITEM_COLUMNS: &str = "id, name, category, status, location, model_3d, thumbnail, \
     specifications, min_tier, created_at, updated_at";

pub(crate) const LIST_ITEMS_SQL: &str = "SELECT id, name, category, status, location, model_3d, \
     thumbnail, specifications, min_tier, created_at, updated_at \
     FROM inventory ORDER BY created_at DESC, id DESC";

// clock_timestamp() keeps successive entries apart; GREATEST keeps them ordered
// even if the database clock steps backwards.
const APPEND_AUDIT_SQL: &str = "INSERT INTO audit_logs (user_id, action, details, created_at) \
     VALUES ($1, $2, $3, GREATEST(clock_timestamp(), \
         COALESCE((SELECT MAX(created_at) FROM audit_logs), '-infinity'::timestamptz))) \
     RETURNING id, user_id, action, details, created_at";

const LATEST_AUDIT_SQL: &str = "SELECT l.id, l.user_id, u.name AS user_name, l.action, l.details, l.created_at \
     FROM audit_logs l LEFT JOIN users u ON l.user_id = u.id \
     ORDER BY l.created_at DESC, l.id DESC LIMIT $1";

type AuditRow = (i64, Option<i64>, String, serde_json::Value, DateTime<Utc>);

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(DEFAULT_ACQUIRE_TIMEOUT)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = query_as::<_, UserRecord>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<UserRecord>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = query_as::<_, UserRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl InventoryStore for PgStore {
    async fn list_items(&self) -> StoreResult<Vec<InventoryItem>> {
        let items = query_as::<_, InventoryItem>(LIST_ITEMS_SQL)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn create_item(&self, draft: &ItemDraft) -> StoreResult<InventoryItem> {
        let sql = format!(
            "INSERT INTO inventory (name, category, status, location, model_3d, thumbnail, specifications, min_tier) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {ITEM_COLUMNS}"
        );
        let item = query_as::<_, InventoryItem>(&sql)
            .bind(&draft.name)
            .bind(&draft.category)
            .bind(&draft.status)
            .bind(&draft.location)
            .bind(&draft.model_3d)
            .bind(&draft.thumbnail)
            .bind(&draft.specifications)
            .bind(draft.min_tier.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(item)
    }

    async fn update_item(&self, id: i64, draft: &ItemDraft) -> StoreResult<Option<InventoryItem>> {
        let sql = format!(
            "UPDATE inventory SET name = $1, category = $2, status = $3, location = $4, \
             model_3d = $5, thumbnail = $6, specifications = $7, min_tier = $8, updated_at = NOW() \
             WHERE id = $9 RETURNING {ITEM_COLUMNS}"
        );
        let item = query_as::<_, InventoryItem>(&sql)
            .bind(&draft.name)
            .bind(&draft.category)
            .bind(&draft.status)
            .bind(&draft.location)
            .bind(&draft.model_3d)
            .bind(&draft.thumbnail)
            .bind(&draft.specifications)
            .bind(draft.min_tier.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    async fn delete_item(&self, id: i64) -> StoreResult<Option<String>> {
        let name = query_scalar::<_, String>("DELETE FROM inventory WHERE id = $1 RETURNING name")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(name)
    }

    async fn inventory_status_counts(&self) -> StoreResult<Vec<StatusCount>> {
        let counts = query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS total FROM inventory GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }
}

#[async_trait]
impl MonitoringStore for PgStore {
    async fn list_cameras(&self) -> StoreResult<Vec<Camera>> {
        let cameras = query_as::<_, Camera>(
            "SELECT id, name, location, status, stream_url FROM cameras ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(cameras)
    }

    async fn latest_alerts(&self, limit: i64) -> StoreResult<Vec<Alert>> {
        let alerts = query_as::<_, Alert>(
            "SELECT id, camera_id, level, message, resolved, created_at FROM alerts \
             ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(alerts)
    }

    async fn camera_status_counts(&self) -> StoreResult<Vec<StatusCount>> {
        let counts = query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS total FROM cameras GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }

    async fn open_alert_level_counts(&self) -> StoreResult<Vec<LevelCount>> {
        let counts = query_as::<_, LevelCount>(
            "SELECT level, COUNT(*) AS total FROM alerts WHERE resolved = FALSE \
             GROUP BY level ORDER BY level",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }
}

#[async_trait]
impl AuditLogReader for PgStore {
    async fn latest_audit_entries(&self, limit: i64) -> StoreResult<Vec<AuditLogView>> {
        let entries = query_as::<_, AuditLogView>(LATEST_AUDIT_SQL)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }
}

#[async_trait]
impl AuditSink for PgStore {
    async fn append(&self, entry: &NewAuditEntry) -> AuditResult<AuditEntry> {
        let (id, user_id, action, details, created_at): AuditRow = query_as(APPEND_AUDIT_SQL)
            .bind(entry.user_id)
            .bind(&entry.action)
            .bind(&entry.details)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from)?;
        Ok(AuditEntry {
            id,
            user_id,
            action,
            details,
            created_at,
        })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
