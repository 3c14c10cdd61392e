// Shared crate clippy configuration
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Pixa shared components
//!
//! Database pool construction, embedded migrations, and the credit plan
//! type used by both the API server and the billing crate.

pub mod db;
pub mod plan;

pub use db::{create_pool, run_migrations};
pub use plan::{Plan, PlanParseError};
