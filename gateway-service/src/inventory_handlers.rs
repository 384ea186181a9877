use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};
use common_auth::AuthContext;
use common_http_errors::{ApiError, ApiResult};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use crate::app::AppState;
use crate::inventory_filter::visible_items;
use crate::models::{InventoryItem, ItemDraft, ItemPayload, ItemValidationError};

#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    pub message: &'static str,
}

impl From<ItemValidationError> for ApiError {
    fn from(value: ItemValidationError) -> Self {
        match value {
            ItemValidationError::BlankName => {
                ApiError::bad_request("invalid_item", "item name is required")
            }
            ItemValidationError::UnknownTier(raw) => {
                ApiError::bad_request("invalid_tier", format!("unknown tier '{raw}'"))
            }
        }
    }
}

fn parse_item(payload: Result<Json<ItemPayload>, JsonRejection>) -> ApiResult<ItemDraft> {
    let Json(payload) = payload
        .map_err(|_| ApiError::bad_request("invalid_item", "request body must be a JSON object"))?;
    Ok(payload.validate()?)
}

fn parse_item_id(path: Result<Path<i64>, PathRejection>) -> ApiResult<i64> {
    let Path(item_id) = path
        .map_err(|_| ApiError::bad_request("invalid_item_id", "item id must be an integer"))?;
    Ok(item_id)
}

pub async fn list_inventory(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<InventoryItem>>> {
    let items = state.store.list_items().await.map_err(ApiError::internal)?;
    let total = items.len();
    let (visible, hidden) = visible_items(&state.policy, auth.tier(), items);

    state.metrics.inventory_hidden_items.inc_by(hidden as u64);
    debug!(
        user_id = auth.user_id(),
        tier = %auth.tier(),
        visible = visible.len(),
        total,
        "inventory filtered"
    );
    Ok(Json(visible))
}

pub async fn create_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<ItemPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<InventoryItem>)> {
    let draft = parse_item(payload)?;
    let item = state
        .store
        .create_item(&draft)
        .await
        .map_err(ApiError::internal)?;

    state.audit.record(
        Some(auth.user_id()),
        "create_item",
        json!({ "item": item.name, "min_tier": draft.min_tier }),
    );
    info!(user_id = auth.user_id(), item_id = item.id, "inventory item created");
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    item_id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ItemPayload>, JsonRejection>,
) -> ApiResult<Json<InventoryItem>> {
    let item_id = parse_item_id(item_id)?;
    let draft = parse_item(payload)?;
    let item = state
        .store
        .update_item(item_id, &draft)
        .await
        .map_err(ApiError::internal)?
        .ok_or(ApiError::not_found("item_not_found", "item not found"))?;

    state.audit.record(
        Some(auth.user_id()),
        "update_item",
        json!({ "item_id": item.id, "name": item.name, "min_tier": draft.min_tier }),
    );
    info!(user_id = auth.user_id(), item_id = item.id, "inventory item updated");
    Ok(Json(item))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    item_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<RemovedResponse>> {
    let item_id = parse_item_id(item_id)?;
    let name = state
        .store
        .delete_item(item_id)
        .await
        .map_err(ApiError::internal)?
        .ok_or(ApiError::not_found("item_not_found", "item not found"))?;

    state.audit.record(
        Some(auth.user_id()),
        "delete_item",
        json!({ "item_id": item_id, "name": name }),
    );
    info!(user_id = auth.user_id(), item_id, "inventory item removed");
    Ok(Json(RemovedResponse {
        message: "item removed",
    }))
}
