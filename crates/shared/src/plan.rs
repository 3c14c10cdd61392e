//! Credit plan tiers
//!
//! The three purchasable plans. Pricing lives in the billing crate's
//! catalog; this type only identifies a plan on the wire and in the
//! `payment_intents.plan` column.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A purchasable credit plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plan {
    Basic,
    Advanced,
    Business,
}

/// Error returned when a plan identifier is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown plan: {0}")]
pub struct PlanParseError(pub String);

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Basic => "Basic",
            Plan::Advanced => "Advanced",
            Plan::Business => "Business",
        }
    }

    /// All plans, in catalog order
    pub fn all() -> [Plan; 3] {
        [Plan::Basic, Plan::Advanced, Plan::Business]
    }
}

impl FromStr for Plan {
    type Err = PlanParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Basic" => Ok(Plan::Basic),
            "Advanced" => Ok(Plan::Advanced),
            "Business" => Ok(Plan::Business),
            other => Err(PlanParseError(other.to_string())),
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
