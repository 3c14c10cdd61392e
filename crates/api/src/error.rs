//! API error types and the uniform response envelope
//!
//! Every handler error renders as `{"success": false, "message": ...}`.
//! Domain errors (bad input on register/login, duplicate account, bad
//! credentials, unknown records, gateway rejection, replayed payment)
//! keep HTTP 200 with success=false, matching the contract the web
//! client was built against. Malformed verify input is 400 and
//! unexpected failures are 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// API error taxonomy
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Malformed input on endpoints that report it as HTTP 400
    #[error("{0}")]
    BadRequest(String),

    /// Duplicate account or double-processed payment
    #[error("{0}")]
    Conflict(String),

    /// Credential mismatch
    #[error("{0}")]
    Auth(String),

    /// Unknown account or transaction
    #[error("{0}")]
    NotFound(String),

    /// External payment gateway failure
    #[error("{0}")]
    Gateway(String),

    /// Missing or invalid session token
    #[error("Not Authorized. Login Again")]
    Unauthorized,

    /// Persistence failure
    #[error("Internal Server Error")]
    Database(#[from] sqlx::Error),

    /// Anything else unexpected
    #[error("Internal Server Error")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// The uniform failure envelope
#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    success: bool,
    message: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            // Domain errors stay 200 with success=false (source contract)
            ApiError::Validation(_)
            | ApiError::Conflict(_)
            | ApiError::Auth(_)
            | ApiError::NotFound(_)
            | ApiError::Gateway(_) => StatusCode::OK,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Database(e) => {
                tracing::error!(error = ?e, "Database error while handling request");
            }
            ApiError::Internal(msg) => {
                tracing::error!(message = %msg, "Internal error while handling request");
            }
            ApiError::Gateway(msg) => {
                tracing::error!(message = %msg, "Payment gateway error while handling request");
            }
            _ => {}
        }

        let body = Json(ErrorEnvelope {
            success: false,
            message: self.to_string(),
        });

        (self.status(), body).into_response()
    }
}
