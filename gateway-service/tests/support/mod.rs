#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header::AUTHORIZATION, header::CONTENT_TYPE, HeaderMap, Method, Request, StatusCode},
    Router,
};
use common_auth::{
    hash_password, HashScheme, PasswordVerifier, Tier, TierPolicy, TokenConfig, TokenService,
    TokenSubject,
};
use gateway_service::{
    build_router,
    models::{InventoryItem, ItemPayload},
    store::{InventoryStore, MemoryStore},
    AppState,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "o_bruce_wayne_e_o_batman";
pub const TEST_ISSUER: &str = "role-gateway-tests";
pub const SEED_BCRYPT_COST: u32 = 4;

pub struct Seeded {
    pub admin: i64,
    pub manager: i64,
    pub employee: i64,
    pub intern: i64,
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub users: Seeded,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("json body")
    }

    pub fn error_code(&self) -> Option<&str> {
        self.headers.get("X-Error-Code").and_then(|v| v.to_str().ok())
    }
}

pub fn token_service() -> TokenService {
    TokenService::new(TokenConfig::new(TEST_SECRET, TEST_ISSUER)).expect("token service")
}

/// Seeds the canonical users: admin and manager with argon2 hashes, the employee
/// with a bcrypt hash of "wayne123", and one user whose tier is not recognised.
pub async fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let admin = store
        .insert_user(
            "Bruce Wayne",
            "bruce@wayne.example",
            &hash_password("batman").expect("hash"),
            "admin",
        )
        .await;
    let manager = store
        .insert_user(
            "Lucius Fox",
            "lucius@wayne.example",
            &hash_password("applied-sciences").expect("hash"),
            "manager",
        )
        .await;
    let employee = store
        .insert_user(
            "Alfred Pennyworth",
            "alfred@wayne.example",
            &bcrypt::hash("wayne123", SEED_BCRYPT_COST).expect("bcrypt"),
            "employee",
        )
        .await;
    let intern = store
        .insert_user(
            "Tim Drake",
            "tim@wayne.example",
            &hash_password("robin").expect("hash"),
            "intern",
        )
        .await;

    // dummy comparisons match the employee's bcrypt cost
    let passwords = PasswordVerifier::with_dummy(HashScheme::Bcrypt, SEED_BCRYPT_COST);
    let state = AppState::new(
        store.clone(),
        token_service(),
        TierPolicy::standard(),
        passwords,
        64,
    )
    .expect("app state");
    let router = build_router(state.clone(), &["http://localhost:3000".to_string()]);

    TestApp {
        router,
        state,
        store,
        users: Seeded {
            admin,
            manager,
            employee,
            intern,
        },
    }
}

impl TestApp {
    pub fn bearer_for(&self, user_id: i64, tier: Tier) -> String {
        let issued = self
            .state
            .tokens
            .issue(&TokenSubject {
                user_id,
                email: format!("user{user_id}@wayne.example"),
                tier,
            })
            .expect("issue");
        format!("Bearer {}", issued.token)
    }

    pub fn admin_bearer(&self) -> String {
        self.bearer_for(self.users.admin, Tier::Admin)
    }

    pub fn manager_bearer(&self) -> String {
        self.bearer_for(self.users.manager, Tier::Manager)
    }

    pub fn employee_bearer(&self) -> String {
        self.bearer_for(self.users.employee, Tier::Employee)
    }

    pub async fn seed_item(&self, name: &str, min_tier: &str) -> InventoryItem {
        let draft = ItemPayload {
            name: Some(name.to_string()),
            status: Some("active".to_string()),
            min_tier: Some(min_tier.to_string()),
            ..Default::default()
        }
        .validate()
        .expect("valid item");
        self.store.create_item(&draft).await.expect("seed item")
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes()
            .to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, bearer: Option<&str>) -> TestResponse {
        self.send(request(Method::GET, uri, bearer, None)).await
    }

    pub async fn send_json(
        &self,
        method: Method,
        uri: &str,
        bearer: Option<&str>,
        body: Value,
    ) -> TestResponse {
        self.send(request(method, uri, bearer, Some(body))).await
    }

    /// Waits for queued audit writes, then returns everything stored.
    pub async fn audit_entries(&self) -> Vec<common_audit::AuditEntry> {
        self.state.audit.flush().await;
        self.store.audit_snapshot().await
    }
}

pub fn request(method: Method, uri: &str, bearer: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(bearer) = bearer {
        builder = builder.header(AUTHORIZATION, bearer);
    }
    match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}
