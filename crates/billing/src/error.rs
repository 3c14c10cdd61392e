//! Billing error types

/// Errors from the billing layer
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    /// Plan identifier not present in the catalog
    #[error("Invalid Plan")]
    UnknownPlan(String),

    /// Gateway order's receipt does not resolve to a payment intent
    #[error("Transaction not found")]
    IntentNotFound,

    /// Payment intent was already reconciled; credits were not granted again
    #[error("Payment already processed")]
    AlreadyProcessed,

    /// External payment gateway failure (transport or non-success response)
    #[error("Payment gateway error: {0}")]
    Gateway(String),

    /// Persistence failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type BillingResult<T> = Result<T, BillingError>;
