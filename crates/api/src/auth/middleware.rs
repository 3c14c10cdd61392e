//! Authentication middleware for Axum
//!
//! Guards the credit-bearing endpoints. Accepts the token either as a
//! standard `Authorization: Bearer` header or as the bare `token` header
//! the original web client sends.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use super::jwt::JwtManager;
use crate::error::ApiError;

/// Authenticated account extracted from the session token
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// State needed for authentication
#[derive(Clone)]
pub struct AuthState {
    pub jwt_manager: JwtManager,
}

/// Extract the session token from `Authorization: Bearer <t>` or `token: <t>`
fn extract_token(request: &Request) -> Option<&str> {
    if let Some(header) = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        if let Some(token) = header.strip_prefix("Bearer ") {
            return Some(token);
        }
    }

    request
        .headers()
        .get("token")
        .and_then(|h| h.to_str().ok())
}

/// Middleware that requires a valid session token
pub async fn require_auth(
    State(auth_state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    let Some(token) = extract_token(&request) else {
        tracing::warn!(path = %path, "require_auth: no token supplied");
        return ApiError::Unauthorized.into_response();
    };

    match auth_state.jwt_manager.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(AuthUser {
                user_id: claims.sub,
            });
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "require_auth: token rejected");
            ApiError::Unauthorized.into_response()
        }
    }
}
