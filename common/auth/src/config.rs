use std::fmt;

use chrono::Duration;

/// Tokens live for a fixed day; there is no refresh or revocation path.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Runtime configuration for token signing and verification.
#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC secret shared by issue and verify.
    pub signing_secret: String,
    /// Issuer claim (iss) written on issue and required on verify.
    pub issuer: String,
    pub ttl: Duration,
}

impl TokenConfig {
    pub fn new(signing_secret: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            signing_secret: signing_secret.into(),
            issuer: issuer.into(),
            ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("signing_secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish()
    }
}
