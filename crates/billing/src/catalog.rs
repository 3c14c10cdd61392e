//! Plan catalog
//!
//! The fixed price list. Intents record these values at creation time, so
//! a catalog change never alters an in-flight purchase.

use pixa_shared::Plan;

/// Credits granted and price charged for one plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanPricing {
    pub credits: i64,
    /// Price in minor currency units (cents / paise)
    pub amount_cents: i64,
}

/// Look up the current pricing for a plan
pub fn pricing(plan: Plan) -> PlanPricing {
    match plan {
        Plan::Basic => PlanPricing {
            credits: 100,
            amount_cents: 10_00,
        },
        Plan::Advanced => PlanPricing {
            credits: 500,
            amount_cents: 50_00,
        },
        Plan::Business => PlanPricing {
            credits: 5000,
            amount_cents: 250_00,
        },
    }
}
