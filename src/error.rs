use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

static EXPOSE_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(false);

/// Whether 500 responses carry the underlying error text. Set once at startup
/// from `APP_ENV`; off unless explicitly enabled.
pub fn set_expose_internal_errors(expose: bool) {
    EXPOSE_INTERNAL_ERRORS.store(expose, Ordering::Relaxed);
}

/// Reasons a credential is rejected by the auth gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authorization denied: missing x-auth-token header")]
    Missing,
    #[error("Invalid token")]
    Invalid,
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token format")]
    Malformed,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Server misconfigured: token secret is not set")]
    ServerMisconfigured,

    #[error("{0}")]
    Validation(String),

    #[error("Meal selections must be made before {0}:00")]
    PastCutoff(u32),

    #[error("{0}")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Not authorized")]
    Forbidden,

    #[error("Too many attempts, try again in a few minutes")]
    RateLimited,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Auth(_) | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::ServerMisconfigured | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Validation(_) | AppError::PastCutoff(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(e.into())
    }
}

/// Bodies that fail to parse or don't fit the request type are client errors
/// and use the same `{"error"}` shape as every other failure.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!("internal error: {e:#}");
                if EXPOSE_INTERNAL_ERRORS.load(Ordering::Relaxed) {
                    e.to_string()
                } else {
                    "An internal server error occurred".to_string()
                }
            }
            AppError::ServerMisconfigured => {
                tracing::error!("JWT secret is not configured");
                self.to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
