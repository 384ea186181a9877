use chrono::{DateTime, Utc};
use common_auth::Tier;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stored credential record. Never serialized; use [`PublicUser`] for responses.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub tier: String,
}

impl UserRecord {
    pub fn tier(&self) -> Tier {
        Tier::parse(&self.tier)
    }

    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            tier: self.tier(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub tier: Tier,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct InventoryItem {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub model_3d: Option<String>,
    pub thumbnail: Option<String>,
    pub specifications: Value,
    pub min_tier: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn min_tier(&self) -> Option<Tier> {
        self.min_tier.as_deref().map(Tier::parse)
    }
}

/// Create/update request body as received.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemPayload {
    pub name: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub model_3d: Option<String>,
    pub thumbnail: Option<String>,
    pub specifications: Option<Value>,
    pub min_tier: Option<String>,
}

/// Validated item fields, ready for the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    pub name: String,
    pub category: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub model_3d: Option<String>,
    pub thumbnail: Option<String>,
    pub specifications: Value,
    pub min_tier: Tier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    BlankName,
    UnknownTier(String),
}

impl ItemPayload {
    pub fn validate(self) -> Result<ItemDraft, ItemValidationError> {
        let name = self
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .ok_or(ItemValidationError::BlankName)?;

        let min_tier = match self.min_tier.as_deref().map(str::trim) {
            None | Some("") => Tier::Employee,
            Some(raw) => {
                let tier = Tier::parse(raw);
                if !tier.is_known() {
                    return Err(ItemValidationError::UnknownTier(raw.to_string()));
                }
                tier
            }
        };

        let specifications = match self.specifications {
            None | Some(Value::Null) => Value::Object(Default::default()),
            Some(value) => value,
        };

        Ok(ItemDraft {
            name,
            category: self.category,
            status: self.status,
            location: self.location,
            model_3d: self.model_3d,
            thumbnail: self.thumbnail,
            specifications,
            min_tier,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Camera {
    pub id: i64,
    pub name: String,
    pub location: Option<String>,
    pub status: String,
    pub stream_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Alert {
    pub id: i64,
    pub camera_id: Option<i64>,
    pub level: String,
    pub message: String,
    pub resolved: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct StatusCount {
    pub status: Option<String>,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct LevelCount {
    pub level: String,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardStats {
    pub inventory: Vec<StatusCount>,
    pub cameras: Vec<StatusCount>,
    pub alerts: Vec<LevelCount>,
}

/// Audit entry joined with the actor's display name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct AuditLogView {
    pub id: i64,
    pub user_id: Option<i64>,
    pub user_name: Option<String>,
    pub action: String,
    pub details: Value,
    pub created_at: DateTime<Utc>,
}
