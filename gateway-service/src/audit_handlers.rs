use axum::{extract::State, Json};
use common_http_errors::{ApiError, ApiResult};

use crate::app::AppState;
use crate::models::AuditLogView;

pub const AUDIT_LOG_PAGE: i64 = 50;

/// Latest audit entries with the actor's name; admin-gated at the router.
pub async fn list_audit_logs(State(state): State<AppState>) -> ApiResult<Json<Vec<AuditLogView>>> {
    let entries = state
        .store
        .latest_audit_entries(AUDIT_LOG_PAGE)
        .await
        .map_err(ApiError::internal)?;
    Ok(Json(entries))
}
