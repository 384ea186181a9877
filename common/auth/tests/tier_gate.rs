use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::AUTHORIZATION, Request, StatusCode},
    middleware::from_fn_with_state,
    routing::get,
    Extension, Router,
};
use common_auth::{require_tier, AuthContext, Tier, TierGate, TierPolicy, TokenConfig, TokenService, TokenSubject};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

fn tokens() -> Arc<TokenService> {
    Arc::new(TokenService::new(TokenConfig::new("gate-secret", "gate-test")).expect("tokens"))
}

fn gated_app(tokens: Arc<TokenService>, min_tier: Tier, hits: Arc<AtomicUsize>) -> Router {
    let gate = TierGate::new(tokens, Arc::new(TierPolicy::standard()), min_tier);
    Router::new()
        .route(
            "/guarded",
            get(move |Extension(auth): Extension<AuthContext>| {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    auth.user_id().to_string()
                }
            }),
        )
        .layer(from_fn_with_state(gate, require_tier))
}

fn bearer(tokens: &TokenService, tier: Tier) -> String {
    let issued = tokens
        .issue(&TokenSubject {
            user_id: 11,
            email: "alfred@wayne.example".into(),
            tier,
        })
        .expect("issue");
    format!("Bearer {}", issued.token)
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn missing_header_is_unauthenticated() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = gated_app(tokens(), Tier::Manager, hits.clone());
    let resp = app
        .oneshot(Request::builder().uri("/guarded").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["message"], "token not provided");
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn bad_token_is_unauthenticated_not_forbidden() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = gated_app(tokens(), Tier::Admin, hits.clone());
    let req = Request::builder()
        .uri("/guarded")
        .header(AUTHORIZATION, "Bearer not-a-token")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["message"], "invalid token");
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn lower_tier_is_forbidden_and_handler_never_runs() {
    let tokens = tokens();
    let hits = Arc::new(AtomicUsize::new(0));
    let app = gated_app(tokens.clone(), Tier::Manager, hits.clone());
    let req = Request::builder()
        .uri("/guarded")
        .header(AUTHORIZATION, bearer(&tokens, Tier::Employee))
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(resp.headers()["x-error-code"], "access_denied");
    assert_eq!(body_json(resp).await["message"], "access denied");
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn higher_tier_passes_with_context() {
    let tokens = tokens();
    let hits = Arc::new(AtomicUsize::new(0));
    let app = gated_app(tokens.clone(), Tier::Manager, hits.clone());
    let req = Request::builder()
        .uri("/guarded")
        .header(AUTHORIZATION, bearer(&tokens, Tier::Admin))
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"11");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unknown_tier_is_forbidden_everywhere() {
    let tokens = tokens();
    let hits = Arc::new(AtomicUsize::new(0));
    let app = gated_app(tokens.clone(), Tier::Employee, hits.clone());
    let req = Request::builder()
        .uri("/guarded")
        .header(AUTHORIZATION, bearer(&tokens, Tier::parse("contractor")))
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}
