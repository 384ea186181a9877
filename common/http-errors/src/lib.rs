use axum::{http::{StatusCode, HeaderValue}, response::{IntoResponse, Response}, Json};
use serde::Serialize;

/// Header carrying the machine-readable error code, read by the error metrics middleware.
pub const ERROR_CODE_HEADER: &str = "X-Error-Code";

const INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    Unauthenticated { code: &'static str, message: &'static str },
    Forbidden { code: &'static str, message: &'static str },
    BadRequest { code: &'static str, message: Option<String> },
    NotFound { code: &'static str, message: &'static str },
    Internal,
}

impl ApiError {
    /// Logs the cause and returns an opaque 500. The cause never reaches the response body.
    pub fn internal<E: std::fmt::Display>(e: E) -> Self {
        tracing::error!(error = %e, "internal error while handling request");
        Self::Internal
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest { code, message: Some(message.into()) }
    }

    pub fn forbidden() -> Self {
        Self::Forbidden { code: "access_denied", message: "access denied" }
    }

    pub fn not_found(code: &'static str, message: &'static str) -> Self {
        Self::NotFound { code, message }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated { code, .. }
            | ApiError::Forbidden { code, .. }
            | ApiError::BadRequest { code, .. }
            | ApiError::NotFound { code, .. } => code,
            ApiError::Internal => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_code = self.code();
        let message = match self {
            ApiError::Unauthenticated { message, .. }
            | ApiError::Forbidden { message, .. }
            | ApiError::NotFound { message, .. } => message.to_string(),
            ApiError::BadRequest { message, code } => message.unwrap_or_else(|| code.replace('_', " ")),
            ApiError::Internal => INTERNAL_MESSAGE.to_string(),
        };
        let body = ErrorBody { code: error_code.into(), message };
        let mut resp = (status, Json(body)).into_response();
        if let Ok(val) = HeaderValue::from_str(error_code) {
            resp.headers_mut().insert(ERROR_CODE_HEADER, val);
        }
        resp
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
