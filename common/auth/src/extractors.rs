use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap, HeaderValue};

use crate::claims::Claims;
use crate::error::{AuthError, AuthResult};
use crate::tiers::Tier;
use crate::tokens::TokenService;

/// Verified bearer identity attached to a request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: Claims,
    pub token: String,
}

impl AuthContext {
    pub fn user_id(&self) -> i64 {
        self.claims.subject
    }

    pub fn tier(&self) -> &Tier {
        &self.claims.tier
    }

    pub fn into_claims(self) -> Claims {
        self.claims
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // already verified by the tier gate
        if let Some(existing) = parts.extensions.get::<AuthContext>() {
            return Ok(existing.clone());
        }

        let tokens = Arc::<TokenService>::from_ref(state);
        let context = authenticate(&parts.headers, &tokens)?;
        parts.extensions.insert(context.clone());
        Ok(context)
    }
}

/// Extracts the bearer token from `Authorization` and verifies it.
pub fn authenticate(headers: &HeaderMap, tokens: &TokenService) -> AuthResult<AuthContext> {
    let header_value = headers.get(AUTHORIZATION).ok_or(AuthError::TokenMissing)?;
    let token = parse_bearer(header_value)?;
    let claims = tokens.verify(&token)?;
    Ok(AuthContext { claims, token })
}

fn parse_bearer(value: &HeaderValue) -> AuthResult<String> {
    let raw = value
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorization)?
        .trim();

    if raw.is_empty() {
        return Err(AuthError::TokenMissing);
    }

    let mut parts = raw.splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AuthError::InvalidAuthorization);
    }

    let token = parts.next().map(str::trim).unwrap_or_default();
    if token.is_empty() {
        return Err(AuthError::TokenMissing);
    }

    Ok(token.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;
    use crate::tokens::TokenSubject;

    #[test]
    fn parse_bearer_accepts_valid_token() {
        let header = HeaderValue::from_static("Bearer abc.def.ghi");
        let token = parse_bearer(&header).expect("token");
        assert_eq!(token, "abc.def.ghi");
    }

    #[test]
    fn parse_bearer_rejects_wrong_scheme() {
        let header = HeaderValue::from_static("Basic credentials");
        let err = parse_bearer(&header).expect_err("should reject");
        assert!(matches!(err, AuthError::InvalidAuthorization));
    }

    #[test]
    fn parse_bearer_treats_empty_token_as_missing() {
        for raw in ["Bearer    ", "Bearer", "   "] {
            let header = HeaderValue::from_static(raw);
            let err = parse_bearer(&header).expect_err("should reject empty token");
            assert!(matches!(err, AuthError::TokenMissing), "{raw:?} gave {err:?}");
        }
    }

    #[test]
    fn authenticate_requires_header() {
        let tokens = TokenService::new(TokenConfig::new("secret", "issuer")).unwrap();
        let err = authenticate(&HeaderMap::new(), &tokens).expect_err("no header");
        assert!(matches!(err, AuthError::TokenMissing));
    }

    #[test]
    fn authenticate_attaches_claims() {
        let tokens = TokenService::new(TokenConfig::new("secret", "issuer")).unwrap();
        let issued = tokens
            .issue(&TokenSubject {
                user_id: 3,
                email: "lucius@wayne.example".into(),
                tier: Tier::Manager,
            })
            .unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", issued.token)).unwrap(),
        );
        let context = authenticate(&headers, &tokens).expect("authenticated");
        assert_eq!(context.user_id(), 3);
        assert_eq!(context.tier(), &Tier::Manager);
        assert_eq!(context.token, issued.token);
    }
}
