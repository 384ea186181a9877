pub mod app;
pub mod audit_handlers;
pub mod config;
pub mod health;
pub mod inventory_filter;
pub mod inventory_handlers;
pub mod models;
pub mod monitoring_handlers;
pub mod store;
pub mod user_handlers;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use common_auth::{require_tier, Tier};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub use app::AppState;
pub use config::{load_gateway_config, GatewayConfig};

use audit_handlers::list_audit_logs;
use health::{error_metrics_mw, health, metrics_endpoint};
use inventory_handlers::{create_item, delete_item, list_inventory, update_item};
use monitoring_handlers::{dashboard_stats, latest_alerts, list_cameras};
use user_handlers::{login_user, verify_session};

pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([ACCEPT, CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}

/// Full HTTP surface. Tier gates run before any handler or store access.
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let admin_only = || from_fn_with_state(state.tier_gate(Tier::Admin), require_tier);
    let manager_only = || from_fn_with_state(state.tier_gate(Tier::Manager), require_tier);

    Router::new()
        .route("/api/health", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/auth/login", post(login_user))
        .route("/api/auth/verify", get(verify_session))
        .route(
            "/api/inventory",
            get(list_inventory).merge(post(create_item).route_layer(admin_only())),
        )
        .route(
            "/api/inventory/:id",
            put(update_item).delete(delete_item).route_layer(admin_only()),
        )
        .route("/api/dashboard/stats", get(dashboard_stats))
        .route(
            "/api/monitoring/cameras",
            get(list_cameras).route_layer(manager_only()),
        )
        .route(
            "/api/monitoring/alerts",
            get(latest_alerts).route_layer(manager_only()),
        )
        .route("/api/logs", get(list_audit_logs).route_layer(admin_only()))
        .with_state(state.clone())
        .layer(from_fn_with_state(state.metrics.clone(), error_metrics_mw))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
}
