use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use common_http_errors::{ApiError, ERROR_CODE_HEADER};
use common_observability::GatewayMetrics;
use serde_json::json;
use tracing::warn;

use crate::app::AppState;

pub const SERVICE_NAME: &str = "gateway-service";

pub async fn health(State(state): State<AppState>) -> Response {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "online",
                "store": "reachable",
                "timestamp": Utc::now(),
            })),
        )
            .into_response(),
        Err(err) => {
            warn!(error = %err, "health check: store unreachable");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "degraded",
                    "store": "unreachable",
                    "timestamp": Utc::now(),
                })),
            )
                .into_response()
        }
    }
}

pub async fn metrics_endpoint(State(metrics): State<Arc<GatewayMetrics>>) -> Response {
    match metrics.render() {
        Ok(body) => {
            let mut response = body.into_response();
            response.headers_mut().insert(
                CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            );
            response
        }
        Err(err) => ApiError::internal(err).into_response(),
    }
}

/// Counts every error response by its `X-Error-Code`.
pub async fn error_metrics_mw(
    State(metrics): State<Arc<GatewayMetrics>>,
    req: Request,
    next: Next,
) -> Response {
    let resp = next.run(req).await;
    let status = resp.status();
    if status.as_u16() >= 400 {
        let code = resp
            .headers()
            .get(ERROR_CODE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown");
        metrics.record_http_error(SERVICE_NAME, code, status.as_u16());
    }
    resp
}
