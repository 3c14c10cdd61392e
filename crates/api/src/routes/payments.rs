//! Payment routes: create a gateway order, verify a settlement

use axum::{
    extract::{Extension, State},
    Json,
};
use serde::{Deserialize, Serialize};

use pixa_billing::{BillingError, GatewayOrder, VerifyOutcome};
use pixa_shared::Plan;

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(rename = "planId")]
    pub plan_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOrderRequest {
    pub order_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: GatewayOrder,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

// =============================================================================
// Validation
// =============================================================================

/// Parse the requested plan; absent and unknown ids are separate messages
fn parse_plan(plan_id: Option<&str>) -> ApiResult<Plan> {
    let plan_id = match plan_id.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return Err(ApiError::Validation("Missing Details".to_string())),
    };

    plan_id
        .parse()
        .map_err(|_| ApiError::Validation("Invalid Plan".to_string()))
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/pay/order
///
/// Records an unpaid payment intent and opens a gateway order. Credits are
/// never granted here.
pub async fn create_order(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateOrderRequest>,
) -> ApiResult<Json<OrderResponse>> {
    let plan = parse_plan(body.plan_id.as_deref())?;

    let order = state
        .orders
        .create_order(auth_user.user_id, plan)
        .await
        .map_err(|e| match e {
            BillingError::Gateway(msg) => ApiError::Gateway(msg),
            BillingError::Database(db) => ApiError::Database(db),
            other => ApiError::Internal(other.to_string()),
        })?;

    Ok(Json(OrderResponse {
        success: true,
        order,
    }))
}

/// POST /api/pay/verify
///
/// Reconciles a settled gateway order; idempotent, so client retries are
/// safe. An unsettled order is a success=false result, not an error.
pub async fn verify_order(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthUser>,
    Json(body): Json<VerifyOrderRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let order_id = match body.order_id.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return Err(ApiError::BadRequest("`order_id` is missing".to_string())),
    };

    match state.orders.verify_order(order_id).await {
        Ok(VerifyOutcome::CreditsGranted) => Ok(Json(MessageResponse {
            success: true,
            message: "Credits Added Successfully".to_string(),
        })),
        Ok(VerifyOutcome::NotCompleted) => Ok(Json(MessageResponse {
            success: false,
            message: "Payment not completed".to_string(),
        })),
        Err(BillingError::IntentNotFound) => {
            Err(ApiError::NotFound("Transaction not found".to_string()))
        }
        Err(BillingError::AlreadyProcessed) => {
            Err(ApiError::Conflict("Payment already processed".to_string()))
        }
        Err(BillingError::Database(db)) => Err(ApiError::Database(db)),
        // Gateway trouble during verification is an unexpected case here,
        // unlike during order creation where it surfaces to the client.
        Err(e) => Err(ApiError::Internal(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plan_accepts_catalog_ids() {
        assert_eq!(parse_plan(Some("Basic")).unwrap(), Plan::Basic);
        assert_eq!(parse_plan(Some("Advanced")).unwrap(), Plan::Advanced);
        assert_eq!(parse_plan(Some("Business")).unwrap(), Plan::Business);
    }

    #[test]
    fn parse_plan_missing_is_missing_details() {
        let err = parse_plan(None).unwrap_err();
        assert_eq!(err.to_string(), "Missing Details");

        let err = parse_plan(Some("  ")).unwrap_err();
        assert_eq!(err.to_string(), "Missing Details");
    }

    #[test]
    fn parse_plan_unknown_is_invalid_plan() {
        let err = parse_plan(Some("Premium")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid Plan");
    }

    #[test]
    fn create_order_request_uses_camel_case_plan_id() {
        let body: CreateOrderRequest = serde_json::from_str(r#"{"planId":"Basic"}"#).unwrap();
        assert_eq!(body.plan_id.as_deref(), Some("Basic"));
    }

    #[test]
    fn verify_request_tolerates_missing_order_id() {
        let body: VerifyOrderRequest = serde_json::from_str("{}").unwrap();
        assert!(body.order_id.is_none());
    }
}
