use axum::{extract::State, Json};
use common_auth::AuthContext;
use common_http_errors::{ApiError, ApiResult};

use crate::app::AppState;
use crate::models::{Alert, Camera, DashboardStats};

pub const LATEST_ALERTS_LIMIT: i64 = 10;

pub async fn dashboard_stats(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> ApiResult<Json<DashboardStats>> {
    let (inventory, cameras, alerts) = tokio::try_join!(
        state.store.inventory_status_counts(),
        state.store.camera_status_counts(),
        state.store.open_alert_level_counts(),
    )
    .map_err(ApiError::internal)?;

    Ok(Json(DashboardStats {
        inventory,
        cameras,
        alerts,
    }))
}

pub async fn list_cameras(State(state): State<AppState>) -> ApiResult<Json<Vec<Camera>>> {
    let cameras = state.store.list_cameras().await.map_err(ApiError::internal)?;
    Ok(Json(cameras))
}

pub async fn latest_alerts(State(state): State<AppState>) -> ApiResult<Json<Vec<Alert>>> {
    let alerts = state
        .store
        .latest_alerts(LATEST_ALERTS_LIMIT)
        .await
        .map_err(ApiError::internal)?;
    Ok(Json(alerts))
}
