use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use common_http_errors::ApiError;
use thiserror::Error;
use tracing::debug;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token not provided")]
    TokenMissing,
    #[error("authorization header malformed")]
    InvalidAuthorization,
    #[error("token verification failed: {0}")]
    TokenInvalid(String),
    #[error("token expired at {0}")]
    TokenExpired(DateTime<Utc>),
    #[error("invalid claim '{0}' with value '{1}'")]
    InvalidClaim(&'static str, String),
    #[error("token signing key not configured")]
    MissingSigningKey,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl AuthError {
    pub fn is_expired(&self) -> bool {
        matches!(self, AuthError::TokenExpired(_))
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        Self::TokenInvalid(value.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::TokenMissing => ApiError::Unauthenticated {
                code: "token_missing",
                message: "token not provided",
            },
            AuthError::InvalidAuthorization
            | AuthError::TokenInvalid(_)
            | AuthError::TokenExpired(_)
            | AuthError::InvalidClaim(_, _) => ApiError::Unauthenticated {
                code: "invalid_token",
                message: "invalid token",
            },
            AuthError::MissingSigningKey | AuthError::Signing(_) => ApiError::internal(value),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        debug!(reason = %self, "rejecting request");
        ApiError::from(self).into_response()
    }
}
