use std::net::SocketAddr;

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::HeaderMap,
    Json,
};
use common_audit::client_ip_from_headers;
use common_auth::{AuthContext, TokenSubject};
use common_http_errors::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::app::AppState;
use crate::models::PublicUser;

pub const LOGIN_SUCCESS: &str = "success";
pub const LOGIN_INVALID_CREDENTIALS: &str = "invalid_credentials";
pub const LOGIN_ERROR: &str = "error";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: PublicUser,
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthenticated {
        code: "invalid_credentials",
        message: "invalid credentials",
    }
}

pub async fn login_user(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(request) = payload.map_err(|_| {
        ApiError::bad_request("invalid_request", "request body must be JSON with email and password")
    })?;
    let email = request.email.trim().to_string();

    let user = match state.store.find_user_by_email(&email).await {
        Ok(user) => user,
        Err(err) => {
            state.record_login_metric(LOGIN_ERROR);
            return Err(ApiError::internal(err));
        }
    };

    // A miss still pays for one hash comparison.
    let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
    let passwords = state.passwords.clone();
    let password = request.password;
    let verified = tokio::task::spawn_blocking(move || match stored_hash {
        Some(hash) => passwords.verify(&password, &hash),
        None => {
            passwords.verify_dummy(&password);
            false
        }
    })
    .await;

    let verified = match verified {
        Ok(verified) => verified,
        Err(err) => {
            state.record_login_metric(LOGIN_ERROR);
            return Err(ApiError::internal(err));
        }
    };

    let user = match user {
        Some(user) if verified => user,
        Some(user) => {
            warn!(user_id = user.id, "login rejected: password mismatch");
            state.record_login_metric(LOGIN_INVALID_CREDENTIALS);
            return Err(invalid_credentials());
        }
        None => {
            warn!("login rejected: unknown email");
            state.record_login_metric(LOGIN_INVALID_CREDENTIALS);
            return Err(invalid_credentials());
        }
    };

    let public = user.public();
    let issued = state
        .tokens
        .issue(&TokenSubject {
            user_id: user.id,
            email: user.email.clone(),
            tier: public.tier.clone(),
        })
        .map_err(|err| {
            state.record_login_metric(LOGIN_ERROR);
            ApiError::from(err)
        })?;

    let ip = client_ip_from_headers(&headers, peer.map(|ConnectInfo(addr)| addr));
    state
        .audit
        .record(Some(user.id), "login", json!({ "email": user.email, "ip": ip }));
    state.record_login_metric(LOGIN_SUCCESS);
    info!(user_id = user.id, tier = %public.tier, "login succeeded");

    Ok(Json(LoginResponse {
        token: issued.token,
        user: public,
    }))
}

pub async fn verify_session(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<SessionResponse>> {
    let user = state
        .store
        .find_user_by_id(auth.user_id())
        .await
        .map_err(ApiError::internal)?
        .ok_or(ApiError::not_found("user_not_found", "user not found"))?;

    Ok(Json(SessionResponse {
        user: user.public(),
    }))
}
