// Billing crate clippy configuration
#![allow(clippy::inconsistent_digit_grouping)] // Minor-unit prices are written as dollars_cents
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Pixa Billing Module
//!
//! Handles credit purchases through an external payment gateway.
//!
//! ## Flow
//!
//! - **Catalog**: fixed pricing for the three credit plans
//! - **Gateway**: adapter over the hosted Orders API (create + fetch)
//! - **Orders**: payment intents and the at-most-once credit grant

pub mod catalog;
pub mod error;
pub mod gateway;
pub mod orders;

// Catalog
pub use catalog::{pricing, PlanPricing};

// Error
pub use error::{BillingError, BillingResult};

// Gateway
pub use gateway::{GatewayConfig, GatewayOrder, HttpGateway, OrderStatus, PaymentGateway};

// Orders
pub use orders::{OrderService, PaymentIntent, VerifyOutcome};
