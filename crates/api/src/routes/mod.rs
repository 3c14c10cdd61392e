//! Route registration

pub mod payments;
pub mod users;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::{auth::require_auth, state::AppState};

/// Build the application router
///
/// Register and login are public; credits and both payment endpoints sit
/// behind the session-token guard.
pub fn create_router(state: AppState) -> Router {
    let auth_state = state.auth_state();

    let protected = Router::new()
        .route("/api/user/credits", post(users::credits))
        .route("/api/pay/order", post(payments::create_order))
        .route("/api/pay/verify", post(payments::verify_order))
        .layer(middleware::from_fn_with_state(auth_state, require_auth));

    Router::new()
        .route("/health", get(health))
        .route("/api/user/register", post(users::register))
        .route("/api/user/login", post(users::login))
        .merge(protected)
        .with_state(state)
}

/// Liveness probe
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
