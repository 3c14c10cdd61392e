//! Account routes: register, login, credits

use axum::{
    extract::{Extension, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    auth::{hash_password, verify_password, AuthUser},
    error::{ApiError, ApiResult},
    state::AppState,
};

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserName {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: UserName,
}

#[derive(Debug, Serialize)]
pub struct CreditsResponse {
    pub success: bool,
    pub credits: i64,
    pub user: UserName,
}

#[derive(Debug, FromRow)]
struct UserAuthRow {
    id: Uuid,
    name: String,
    password_hash: String,
}

#[derive(Debug, FromRow)]
struct UserBalanceRow {
    name: String,
    credit_balance: i64,
}

// =============================================================================
// Validation
// =============================================================================

/// Presence check for a request field; blank counts as missing
fn required(field: &Option<String>) -> ApiResult<&str> {
    match field.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::Validation("Missing Details".to_string())),
    }
}

/// Presence check that keeps the value verbatim; whitespace is part of a
/// password, so it is never trimmed before hashing or verification
fn required_verbatim(field: &Option<String>) -> ApiResult<&str> {
    match field.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::Validation("Missing Details".to_string())),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/user/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let name = required(&body.name)?;
    let email = required(&body.email)?;
    let password = required_verbatim(&body.password)?;

    let password_hash = hash_password(password)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?;

    // The unique email constraint is the conflict check; no read-then-insert.
    let user_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO users (name, email, password_hash)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(&password_hash)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| {
        if e.as_database_error()
            .is_some_and(|db| db.is_unique_violation())
        {
            ApiError::Conflict("User already exists".to_string())
        } else {
            ApiError::Database(e)
        }
    })?;

    let token = state
        .jwt_manager
        .issue_token(user_id)
        .map_err(|e| ApiError::Internal(format!("token issuance failed: {e}")))?;

    tracing::info!(user_id = %user_id, "New account registered");

    Ok(Json(AuthResponse {
        success: true,
        token,
        user: UserName {
            name: name.to_string(),
        },
    }))
}

/// POST /api/user/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let email = required(&body.email)?;
    let password = required_verbatim(&body.password)?;

    let user: Option<UserAuthRow> =
        sqlx::query_as("SELECT id, name, password_hash FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&state.pool)
            .await?;

    let Some(user) = user else {
        return Err(ApiError::NotFound("User does not exist".to_string()));
    };

    if !verify_password(password, &user.password_hash) {
        return Err(ApiError::Auth("Invalid Credentials".to_string()));
    }

    let token = state
        .jwt_manager
        .issue_token(user.id)
        .map_err(|e| ApiError::Internal(format!("token issuance failed: {e}")))?;

    Ok(Json(AuthResponse {
        success: true,
        token,
        user: UserName { name: user.name },
    }))
}

/// POST /api/user/credits
///
/// Read-only; the account comes from the session token, never the body.
pub async fn credits(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Json<CreditsResponse>> {
    let user: Option<UserBalanceRow> =
        sqlx::query_as("SELECT name, credit_balance FROM users WHERE id = $1")
            .bind(auth_user.user_id)
            .fetch_optional(&state.pool)
            .await?;

    let Some(user) = user else {
        return Err(ApiError::NotFound("User not found".to_string()));
    };

    Ok(Json(CreditsResponse {
        success: true,
        credits: user.credit_balance,
        user: UserName { name: user.name },
    }))
}
