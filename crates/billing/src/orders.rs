//! Payment intents and the credit grant
//!
//! `create_order` records an intent with the catalog values frozen at that
//! instant, then asks the gateway for an order carrying the intent id as
//! its receipt. `verify_order` reconciles a settled order back to its
//! intent and grants credits at most once.

use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use pixa_shared::Plan;

use crate::catalog;
use crate::error::{BillingError, BillingResult};
use crate::gateway::{GatewayOrder, PaymentGateway};

/// A persisted payment intent
#[derive(Debug, Clone, FromRow)]
pub struct PaymentIntent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan: String,
    pub amount_cents: i64,
    pub credits: i64,
    pub paid: bool,
    pub created_at: OffsetDateTime,
}

/// Result of a verification attempt that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Order settled and credits were granted by this call
    CreditsGranted,
    /// Order exists but the gateway has not captured funds yet
    NotCompleted,
}

/// Order lifecycle service: intent creation and settlement reconciliation
pub struct OrderService<G: PaymentGateway> {
    pool: PgPool,
    gateway: G,
    currency: String,
}

#[derive(Debug, FromRow)]
struct ClaimedIntent {
    user_id: Uuid,
    credits: i64,
}

impl<G: PaymentGateway> OrderService<G> {
    pub fn new(pool: PgPool, gateway: G, currency: impl Into<String>) -> Self {
        Self {
            pool,
            gateway,
            currency: currency.into(),
        }
    }

    /// Initiate a purchase: record an unpaid intent, then open a gateway
    /// order whose receipt is the intent id.
    ///
    /// The intent freezes the catalog's credits and price; a later catalog
    /// change cannot alter what this purchase grants. No credits are ever
    /// granted on this path, even if the gateway call fails.
    pub async fn create_order(&self, user_id: Uuid, plan: Plan) -> BillingResult<GatewayOrder> {
        let pricing = catalog::pricing(plan);

        let intent_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO payment_intents (user_id, plan, amount_cents, credits)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(plan.as_str())
        .bind(pricing.amount_cents)
        .bind(pricing.credits)
        .fetch_one(&self.pool)
        .await?;

        let order = self
            .gateway
            .create_order(pricing.amount_cents, &self.currency, &intent_id.to_string())
            .await?;

        tracing::info!(
            user_id = %user_id,
            intent_id = %intent_id,
            order_id = %order.id,
            plan = %plan,
            amount_cents = pricing.amount_cents,
            "Payment intent created and gateway order opened"
        );

        Ok(order)
    }

    /// Reconcile a gateway order and grant credits at most once.
    ///
    /// The paid flag is claimed with a conditional UPDATE so that
    /// concurrent verifications of the same order cannot both grant; the
    /// claim and the balance increment commit as one transaction, so a
    /// failure between them rolls the claim back.
    pub async fn verify_order(&self, order_id: &str) -> BillingResult<VerifyOutcome> {
        let order = self.gateway.fetch_order(order_id).await?;

        if !order.status.is_settled() {
            tracing::debug!(order_id = %order_id, status = ?order.status, "Order not settled yet");
            return Ok(VerifyOutcome::NotCompleted);
        }

        let intent_id = order
            .receipt
            .as_deref()
            .and_then(|r| Uuid::parse_str(r).ok())
            .ok_or(BillingError::IntentNotFound)?;

        let mut tx = self.pool.begin().await?;

        // Atomic claim: only the first settled verification flips the flag.
        let claimed: Option<ClaimedIntent> = sqlx::query_as(
            r#"
            UPDATE payment_intents
            SET paid = TRUE
            WHERE id = $1 AND paid = FALSE
            RETURNING user_id, credits
            "#,
        )
        .bind(intent_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(claimed) = claimed else {
            // Distinguish an unknown receipt from a replayed one.
            let intent: Option<PaymentIntent> = sqlx::query_as(
                r#"
                SELECT id, user_id, plan, amount_cents, credits, paid, created_at
                FROM payment_intents
                WHERE id = $1
                "#,
            )
            .bind(intent_id)
            .fetch_optional(&mut *tx)
            .await?;

            return match intent {
                Some(_) => Err(BillingError::AlreadyProcessed),
                None => Err(BillingError::IntentNotFound),
            };
        };

        sqlx::query(
            r#"
            UPDATE users
            SET credit_balance = credit_balance + $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(claimed.credits)
        .bind(claimed.user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order_id,
            intent_id = %intent_id,
            user_id = %claimed.user_id,
            credits = claimed.credits,
            "Credits granted for settled order"
        );

        Ok(VerifyOutcome::CreditsGranted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::OrderStatus;
    use async_trait::async_trait;
    use sqlx::postgres::PgPoolOptions;

    /// Fake gateway returning canned orders; never touches the network
    struct FakeGateway {
        fetch_result: BillingResult<GatewayOrder>,
    }

    #[async_trait]
    impl PaymentGateway for FakeGateway {
        async fn create_order(
            &self,
            amount_cents: i64,
            currency: &str,
            receipt: &str,
        ) -> BillingResult<GatewayOrder> {
            Ok(GatewayOrder {
                id: "order_fake".to_string(),
                amount: amount_cents,
                currency: currency.to_string(),
                receipt: Some(receipt.to_string()),
                status: OrderStatus::Created,
            })
        }

        async fn fetch_order(&self, _order_id: &str) -> BillingResult<GatewayOrder> {
            match &self.fetch_result {
                Ok(order) => Ok(order.clone()),
                Err(BillingError::Gateway(msg)) => Err(BillingError::Gateway(msg.clone())),
                Err(_) => unreachable!("fake only stores gateway errors"),
            }
        }
    }

    /// Lazy pool: valid handle, no connection until a query runs. The
    /// tests below only exercise paths that return before any query.
    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/pixa_test")
            .unwrap()
    }

    fn settled_order(receipt: Option<&str>) -> GatewayOrder {
        GatewayOrder {
            id: "order_fake".to_string(),
            amount: 1000,
            currency: "USD".to_string(),
            receipt: receipt.map(String::from),
            status: OrderStatus::Paid,
        }
    }

    #[tokio::test]
    async fn unsettled_order_is_not_completed() {
        let gateway = FakeGateway {
            fetch_result: Ok(GatewayOrder {
                status: OrderStatus::Created,
                ..settled_order(Some("ignored"))
            }),
        };
        let service = OrderService::new(lazy_pool(), gateway, "USD");

        let outcome = service.verify_order("order_fake").await.unwrap();
        assert_eq!(outcome, VerifyOutcome::NotCompleted);
    }

    #[tokio::test]
    async fn attempted_order_is_not_completed() {
        let gateway = FakeGateway {
            fetch_result: Ok(GatewayOrder {
                status: OrderStatus::Attempted,
                ..settled_order(Some("ignored"))
            }),
        };
        let service = OrderService::new(lazy_pool(), gateway, "USD");

        let outcome = service.verify_order("order_fake").await.unwrap();
        assert_eq!(outcome, VerifyOutcome::NotCompleted);
    }

    #[tokio::test]
    async fn settled_order_without_receipt_is_not_found() {
        let gateway = FakeGateway {
            fetch_result: Ok(settled_order(None)),
        };
        let service = OrderService::new(lazy_pool(), gateway, "USD");

        let err = service.verify_order("order_fake").await.unwrap_err();
        assert!(matches!(err, BillingError::IntentNotFound));
    }

    #[tokio::test]
    async fn settled_order_with_garbage_receipt_is_not_found() {
        let gateway = FakeGateway {
            fetch_result: Ok(settled_order(Some("not-a-uuid"))),
        };
        let service = OrderService::new(lazy_pool(), gateway, "USD");

        let err = service.verify_order("order_fake").await.unwrap_err();
        assert!(matches!(err, BillingError::IntentNotFound));
    }

    #[tokio::test]
    async fn gateway_failure_propagates() {
        let gateway = FakeGateway {
            fetch_result: Err(BillingError::Gateway("connection refused".to_string())),
        };
        let service = OrderService::new(lazy_pool(), gateway, "USD");

        let err = service.verify_order("order_fake").await.unwrap_err();
        assert!(matches!(err, BillingError::Gateway(_)));
    }

    // The tests below exercise the storage contract and need a live
    // Postgres with migrations applied; run with
    // `DATABASE_URL=... cargo test -- --ignored`.

    async fn db_pool() -> PgPool {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/pixa_test".to_string());
        PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database")
    }

    async fn create_test_user(pool: &PgPool) -> Uuid {
        sqlx::query_scalar(
            "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, 'TEST_HASH') RETURNING id",
        )
        .bind("Test User")
        .bind(format!("test-{}@example.com", Uuid::new_v4()))
        .fetch_one(pool)
        .await
        .expect("Failed to create test user")
    }

    async fn balance_of(pool: &PgPool, user_id: Uuid) -> i64 {
        sqlx::query_scalar("SELECT credit_balance FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    /// Gateway whose fetch reports whatever receipt the last create used
    struct RecordingGateway {
        receipt: std::sync::Mutex<Option<String>>,
    }

    #[async_trait]
    impl PaymentGateway for RecordingGateway {
        async fn create_order(
            &self,
            amount_cents: i64,
            currency: &str,
            receipt: &str,
        ) -> BillingResult<GatewayOrder> {
            *self.receipt.lock().unwrap() = Some(receipt.to_string());
            Ok(GatewayOrder {
                id: "order_recorded".to_string(),
                amount: amount_cents,
                currency: currency.to_string(),
                receipt: Some(receipt.to_string()),
                status: OrderStatus::Created,
            })
        }

        async fn fetch_order(&self, _order_id: &str) -> BillingResult<GatewayOrder> {
            let receipt = self.receipt.lock().unwrap().clone();
            Ok(GatewayOrder {
                id: "order_recorded".to_string(),
                amount: 1000,
                currency: "USD".to_string(),
                receipt,
                status: OrderStatus::Paid,
            })
        }
    }

    #[tokio::test]
    #[ignore = "requires a Postgres instance via DATABASE_URL"]
    async fn create_order_freezes_catalog_values() {
        let pool = db_pool().await;
        let user_id = create_test_user(&pool).await;
        let service = OrderService::new(
            pool.clone(),
            RecordingGateway {
                receipt: std::sync::Mutex::new(None),
            },
            "USD",
        );

        let order = service.create_order(user_id, Plan::Basic).await.unwrap();

        let intent_id = Uuid::parse_str(order.receipt.as_deref().unwrap()).unwrap();
        let intent: PaymentIntent = sqlx::query_as(
            "SELECT id, user_id, plan, amount_cents, credits, paid, created_at FROM payment_intents WHERE id = $1",
        )
        .bind(intent_id)
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(intent.user_id, user_id);
        assert_eq!(intent.plan, "Basic");
        assert_eq!(intent.credits, 100);
        assert_eq!(intent.amount_cents, 1000);
        assert!(!intent.paid);
        assert_eq!(balance_of(&pool, user_id).await, 0);
    }

    #[tokio::test]
    #[ignore = "requires a Postgres instance via DATABASE_URL"]
    async fn settled_order_grants_credits_exactly_once() {
        let pool = db_pool().await;
        let user_id = create_test_user(&pool).await;
        let service = OrderService::new(
            pool.clone(),
            RecordingGateway {
                receipt: std::sync::Mutex::new(None),
            },
            "USD",
        );

        let order = service.create_order(user_id, Plan::Basic).await.unwrap();

        let outcome = service.verify_order(&order.id).await.unwrap();
        assert_eq!(outcome, VerifyOutcome::CreditsGranted);
        assert_eq!(balance_of(&pool, user_id).await, 100);

        // Replay: the intent is already reconciled, balance must not move.
        let err = service.verify_order(&order.id).await.unwrap_err();
        assert!(matches!(err, BillingError::AlreadyProcessed));
        assert_eq!(balance_of(&pool, user_id).await, 100);
    }
}
