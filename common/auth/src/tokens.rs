use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

use crate::claims::{Claims, ClaimsRepr};
use crate::config::TokenConfig;
use crate::error::{AuthError, AuthResult};
use crate::tiers::Tier;

/// Identity embedded into an issued token.
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub user_id: i64,
    pub email: String,
    pub tier: Tier,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub token_type: &'static str,
}

/// Issues and verifies HS256 bearer tokens with a server-held secret.
///
/// Expiry is checked against an explicit clock in [`TokenService::verify_at`] so callers
/// (and tests) control time; [`TokenService::verify`] uses the wall clock.
#[derive(Clone)]
pub struct TokenService {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> AuthResult<Self> {
        if config.signing_secret.trim().is_empty() {
            return Err(AuthError::MissingSigningKey);
        }
        let secret = config.signing_secret.as_bytes();
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            config,
        })
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    pub fn issue(&self, subject: &TokenSubject) -> AuthResult<IssuedToken> {
        self.issue_at(subject, Utc::now())
    }

    pub fn issue_at(&self, subject: &TokenSubject, now: DateTime<Utc>) -> AuthResult<IssuedToken> {
        let iat = now.timestamp();
        let exp = iat + self.config.ttl.num_seconds();

        let repr = ClaimsRepr {
            sub: subject.user_id.to_string(),
            email: subject.email.clone(),
            tier: subject.tier.as_str().to_string(),
            iss: self.config.issuer.clone(),
            iat,
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS256), &repr, &self.encoding_key)
            .map_err(|err| AuthError::Signing(err.to_string()))?;

        Ok(IssuedToken {
            token,
            issued_at: to_datetime("iat", iat)?,
            expires_at: to_datetime("exp", exp)?,
            token_type: "Bearer",
        })
    }

    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<Claims> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::TokenMissing);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        // expiry is decided below against `now`
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        let token_data = decode::<ClaimsRepr>(token, &self.decoding_key, &validation)?;
        let claims = Claims::try_from(token_data.claims)?;

        if now >= claims.expires_at {
            return Err(AuthError::TokenExpired(claims.expires_at));
        }

        debug!(user_id = claims.subject, tier = %claims.tier, "verified bearer token");
        Ok(claims)
    }
}

fn to_datetime(name: &'static str, value: i64) -> AuthResult<DateTime<Utc>> {
    Utc.timestamp_opt(value, 0)
        .single()
        .ok_or_else(|| AuthError::InvalidClaim(name, value.to_string()))
}
