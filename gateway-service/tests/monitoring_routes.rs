mod support;

use axum::http::{Method, StatusCode};
use serde_json::json;
use support::spawn_app;

#[tokio::test]
async fn cameras_require_manager() {
    let app = spawn_app().await;
    app.store.insert_camera("Gate 1", Some("Wayne Tower lobby"), "online").await;
    app.store.insert_camera("Roof", None, "offline").await;

    let employee = app.get("/api/monitoring/cameras", Some(&app.employee_bearer())).await;
    assert_eq!(employee.status, StatusCode::FORBIDDEN);

    let manager = app.get("/api/monitoring/cameras", Some(&app.manager_bearer())).await;
    assert_eq!(manager.status, StatusCode::OK);
    let body = manager.json();
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2]);

    let admin = app.get("/api/monitoring/cameras", Some(&app.admin_bearer())).await;
    assert_eq!(admin.status, StatusCode::OK);
}

#[tokio::test]
async fn alerts_return_latest_ten() {
    let app = spawn_app().await;
    let camera = app.store.insert_camera("Gate 1", None, "online").await;
    for n in 0..12 {
        app.store
            .insert_alert(Some(camera), "high", &format!("motion #{n}"), false)
            .await;
    }

    let resp = app.get("/api/monitoring/alerts", Some(&app.manager_bearer())).await;
    assert_eq!(resp.status, StatusCode::OK);
    let alerts = resp.json();
    let alerts = alerts.as_array().unwrap();
    assert_eq!(alerts.len(), 10);
    assert_eq!(alerts[0]["message"], "motion #11");

    let unauthenticated = app.get("/api/monitoring/alerts", None).await;
    assert_eq!(unauthenticated.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn dashboard_counts_are_grouped() {
    let app = spawn_app().await;
    app.seed_item("Utility belt", "employee").await;
    app.seed_item("Cowl", "admin").await;
    app.store.insert_camera("Gate 1", None, "online").await;
    app.store.insert_camera("Gate 2", None, "online").await;
    app.store.insert_camera("Roof", None, "offline").await;
    app.store.insert_alert(None, "high", "breach", false).await;
    app.store.insert_alert(None, "high", "resolved breach", true).await;
    app.store.insert_alert(None, "low", "door ajar", false).await;

    let resp = app.get("/api/dashboard/stats", Some(&app.employee_bearer())).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.json(),
        json!({
            "inventory": [{ "status": "active", "total": 2 }],
            "cameras": [
                { "status": "offline", "total": 1 },
                { "status": "online", "total": 2 }
            ],
            "alerts": [
                { "level": "high", "total": 1 },
                { "level": "low", "total": 1 }
            ]
        })
    );

    let anonymous = app.get("/api/dashboard/stats", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn audit_log_listing_is_admin_only_and_named() {
    let app = spawn_app().await;
    app.send_json(
        Method::POST,
        "/api/auth/login",
        None,
        json!({ "email": "lucius@wayne.example", "password": "applied-sciences" }),
    )
    .await;
    app.audit_entries().await;

    let manager = app.get("/api/logs", Some(&app.manager_bearer())).await;
    assert_eq!(manager.status, StatusCode::FORBIDDEN);

    let admin = app.get("/api/logs", Some(&app.admin_bearer())).await;
    assert_eq!(admin.status, StatusCode::OK);
    let logs = admin.json();
    let logs = logs.as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["action"], "login");
    assert_eq!(logs[0]["user_name"], "Lucius Fox");
    assert_eq!(logs[0]["details"]["email"], "lucius@wayne.example");
}

#[tokio::test]
async fn health_reports_store_reachability() {
    let app = spawn_app().await;
    let online = app.get("/api/health", None).await;
    assert_eq!(online.status, StatusCode::OK);
    let body = online.json();
    assert_eq!(body["status"], "online");
    assert_eq!(body["store"], "reachable");
    assert!(body["timestamp"].is_string());

    app.store.set_available(false);
    let degraded = app.get("/api/health", None).await;
    assert_eq!(degraded.status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = degraded.json();
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["store"], "unreachable");
}

#[tokio::test]
async fn forbidden_responses_are_counted() {
    let app = spawn_app().await;
    app.get("/api/logs", Some(&app.employee_bearer())).await;
    app.get("/api/inventory", None).await;

    let text = String::from_utf8(app.get("/metrics", None).await.body).unwrap();
    assert!(text.contains(
        "http_errors_total{code=\"access_denied\",service=\"gateway-service\",status=\"403\"} 1"
    ));
    assert!(text.contains(
        "http_errors_total{code=\"token_missing\",service=\"gateway-service\",status=\"401\"} 1"
    ));
}

#[tokio::test]
async fn cors_allows_configured_origin() {
    let app = spawn_app().await;
    let req = axum::http::Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/inventory")
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "GET")
        .body(axum::body::Body::empty())
        .unwrap();
    let resp = app.send(req).await;
    assert_eq!(
        resp.headers
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3000")
    );
}
