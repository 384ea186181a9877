use std::sync::Arc;

use axum::extract::{FromRef, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use common_http_errors::ApiError;
use tracing::warn;

use crate::extractors::{authenticate, AuthContext};
use crate::tiers::{Tier, TierPolicy};
use crate::tokens::TokenService;

#[derive(Debug, Clone)]
pub enum GuardError {
    Forbidden { required: Tier, actual: Tier },
}

impl From<GuardError> for ApiError {
    fn from(_: GuardError) -> Self {
        ApiError::forbidden()
    }
}

impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

pub fn ensure_tier(policy: &TierPolicy, auth: &AuthContext, required: &Tier) -> Result<(), GuardError> {
    if policy.at_least(auth.tier(), required) {
        return Ok(());
    }

    warn!(
        user_id = auth.user_id(),
        tier = %auth.tier(),
        required = %required,
        "tier_check_failed"
    );
    Err(GuardError::Forbidden {
        required: required.clone(),
        actual: auth.tier().clone(),
    })
}

/// State for [`require_tier`]: one gate per minimum tier.
#[derive(Clone)]
pub struct TierGate {
    tokens: Arc<TokenService>,
    policy: Arc<TierPolicy>,
    min_tier: Tier,
}

impl TierGate {
    pub fn new(tokens: Arc<TokenService>, policy: Arc<TierPolicy>, min_tier: Tier) -> Self {
        Self {
            tokens,
            policy,
            min_tier,
        }
    }

    pub fn min_tier(&self) -> &Tier {
        &self.min_tier
    }
}

impl FromRef<TierGate> for Arc<TokenService> {
    fn from_ref(gate: &TierGate) -> Self {
        gate.tokens.clone()
    }
}

/// Route middleware: authenticate, then require `gate.min_tier`.
///
/// Rejects with 401 before 403 and never lets the request reach the handler on failure.
pub async fn require_tier(State(gate): State<TierGate>, mut request: Request, next: Next) -> Response {
    let auth = match request.extensions().get::<AuthContext>().cloned() {
        Some(existing) => existing,
        None => match authenticate(request.headers(), &gate.tokens) {
            Ok(auth) => auth,
            Err(err) => return err.into_response(),
        },
    };

    if let Err(err) = ensure_tier(&gate.policy, &auth, &gate.min_tier) {
        return err.into_response();
    }

    request.extensions_mut().insert(auth);
    next.run(request).await
}
