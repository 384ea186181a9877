use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use common_audit::{AuditEntry, AuditResult, AuditSink, NewAuditEntry};
use tokio::sync::Mutex;

use super::{
    AuditLogReader, InventoryStore, MonitoringStore, Store, StoreError, StoreResult, UserStore,
};
use crate::models::{
    Alert, AuditLogView, Camera, InventoryItem, ItemDraft, LevelCount, StatusCount, UserRecord,
};

#[derive(Default)]
struct MemoryState {
    users: Vec<UserRecord>,
    items: Vec<InventoryItem>,
    cameras: Vec<Camera>,
    alerts: Vec<Alert>,
    audit: Vec<AuditEntry>,
    next_item_id: i64,
    next_alert_id: i64,
}

/// In-process store used by tests and local runs without Postgres.
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulates losing the database; every call fails with `StoreError::Unavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable)
        }
    }

    pub async fn insert_user(&self, name: &str, email: &str, password_hash: &str, tier: &str) -> i64 {
        let mut state = self.state.lock().await;
        let id = state.users.len() as i64 + 1;
        state.users.push(UserRecord {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            tier: tier.to_string(),
        });
        id
    }

    pub async fn insert_camera(&self, name: &str, location: Option<&str>, status: &str) -> i64 {
        let mut state = self.state.lock().await;
        let id = state.cameras.len() as i64 + 1;
        state.cameras.push(Camera {
            id,
            name: name.to_string(),
            location: location.map(str::to_string),
            status: status.to_string(),
            stream_url: None,
        });
        id
    }

    pub async fn insert_alert(&self, camera_id: Option<i64>, level: &str, message: &str, resolved: bool) -> i64 {
        let mut state = self.state.lock().await;
        state.next_alert_id += 1;
        let id = state.next_alert_id;
        state.alerts.push(Alert {
            id,
            camera_id,
            level: level.to_string(),
            message: message.to_string(),
            resolved,
            created_at: Utc::now(),
        });
        id
    }

    pub async fn items_snapshot(&self) -> Vec<InventoryItem> {
        self.state.lock().await.items.clone()
    }

    pub async fn audit_snapshot(&self) -> Vec<AuditEntry> {
        self.state.lock().await.audit.clone()
    }
}

fn newest_first<T, K: Ord>(rows: &mut [T], key: impl Fn(&T) -> K) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

fn count_by<'a>(values: impl Iterator<Item = Option<&'a str>>) -> BTreeMap<Option<String>, i64> {
    let mut counts = BTreeMap::new();
    for value in values {
        *counts.entry(value.map(str::to_string)).or_insert(0) += 1;
    }
    counts
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        self.check()?;
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<UserRecord>> {
        self.check()?;
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn list_items(&self) -> StoreResult<Vec<InventoryItem>> {
        self.check()?;
        let mut items = self.state.lock().await.items.clone();
        newest_first(&mut items, |item| (item.created_at, item.id));
        Ok(items)
    }

    async fn create_item(&self, draft: &ItemDraft) -> StoreResult<InventoryItem> {
        self.check()?;
        let mut state = self.state.lock().await;
        state.next_item_id += 1;
        let now = Utc::now();
        let item = InventoryItem {
            id: state.next_item_id,
            name: draft.name.clone(),
            category: draft.category.clone(),
            status: draft.status.clone(),
            location: draft.location.clone(),
            model_3d: draft.model_3d.clone(),
            thumbnail: draft.thumbnail.clone(),
            specifications: draft.specifications.clone(),
            min_tier: Some(draft.min_tier.as_str().to_string()),
            created_at: now,
            updated_at: now,
        };
        state.items.push(item.clone());
        Ok(item)
    }

    async fn update_item(&self, id: i64, draft: &ItemDraft) -> StoreResult<Option<InventoryItem>> {
        self.check()?;
        let mut state = self.state.lock().await;
        let Some(item) = state.items.iter_mut().find(|item| item.id == id) else {
            return Ok(None);
        };
        item.name = draft.name.clone();
        item.category = draft.category.clone();
        item.status = draft.status.clone();
        item.location = draft.location.clone();
        item.model_3d = draft.model_3d.clone();
        item.thumbnail = draft.thumbnail.clone();
        item.specifications = draft.specifications.clone();
        item.min_tier = Some(draft.min_tier.as_str().to_string());
        item.updated_at = Utc::now();
        Ok(Some(item.clone()))
    }

    async fn delete_item(&self, id: i64) -> StoreResult<Option<String>> {
        self.check()?;
        let mut state = self.state.lock().await;
        let Some(position) = state.items.iter().position(|item| item.id == id) else {
            return Ok(None);
        };
        Ok(Some(state.items.remove(position).name))
    }

    async fn inventory_status_counts(&self) -> StoreResult<Vec<StatusCount>> {
        self.check()?;
        let state = self.state.lock().await;
        Ok(count_by(state.items.iter().map(|item| item.status.as_deref()))
            .into_iter()
            .map(|(status, total)| StatusCount { status, total })
            .collect())
    }
}

#[async_trait]
impl MonitoringStore for MemoryStore {
    async fn list_cameras(&self) -> StoreResult<Vec<Camera>> {
        self.check()?;
        let mut cameras = self.state.lock().await.cameras.clone();
        cameras.sort_by_key(|camera| camera.id);
        Ok(cameras)
    }

    async fn latest_alerts(&self, limit: i64) -> StoreResult<Vec<Alert>> {
        self.check()?;
        let mut alerts = self.state.lock().await.alerts.clone();
        newest_first(&mut alerts, |alert| (alert.created_at, alert.id));
        alerts.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(alerts)
    }

    async fn camera_status_counts(&self) -> StoreResult<Vec<StatusCount>> {
        self.check()?;
        let state = self.state.lock().await;
        Ok(count_by(state.cameras.iter().map(|camera| Some(camera.status.as_str())))
            .into_iter()
            .map(|(status, total)| StatusCount { status, total })
            .collect())
    }

    async fn open_alert_level_counts(&self) -> StoreResult<Vec<LevelCount>> {
        self.check()?;
        let state = self.state.lock().await;
        let open = state
            .alerts
            .iter()
            .filter(|alert| !alert.resolved)
            .map(|alert| Some(alert.level.as_str()));
        Ok(count_by(open)
            .into_iter()
            .map(|(level, total)| LevelCount {
                level: level.unwrap_or_default(),
                total,
            })
            .collect())
    }
}

#[async_trait]
impl AuditLogReader for MemoryStore {
    async fn latest_audit_entries(&self, limit: i64) -> StoreResult<Vec<AuditLogView>> {
        self.check()?;
        let state = self.state.lock().await;
        let mut entries: Vec<AuditLogView> = state
            .audit
            .iter()
            .map(|entry| AuditLogView {
                id: entry.id,
                user_id: entry.user_id,
                user_name: entry
                    .user_id
                    .and_then(|id| state.users.iter().find(|u| u.id == id))
                    .map(|u| u.name.clone()),
                action: entry.action.clone(),
                details: entry.details.clone(),
                created_at: entry.created_at,
            })
            .collect();
        newest_first(&mut entries, |entry| (entry.created_at, entry.id));
        entries.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(entries)
    }
}

#[async_trait]
impl AuditSink for MemoryStore {
    async fn append(&self, entry: &NewAuditEntry) -> AuditResult<AuditEntry> {
        self.check()?;
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let created_at = match state.audit.last() {
            Some(last) if last.created_at > now => last.created_at,
            _ => now,
        };
        let stored = AuditEntry {
            id: state.audit.len() as i64 + 1,
            user_id: entry.user_id,
            action: entry.action.clone(),
            details: entry.details.clone(),
            created_at,
        };
        state.audit.push(stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.check()
    }
}
