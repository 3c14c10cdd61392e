//! Payment gateway adapter
//!
//! Wraps the hosted gateway's Orders API behind a trait so the order
//! service can be driven by a fake in tests. The real client talks to a
//! Razorpay-compatible REST API with HTTP basic auth.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{BillingError, BillingResult};

/// Gateway credentials and endpoint, read once at process start
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub key_id: String,
    pub key_secret: String,
    pub base_url: String,
    pub currency: String,
}

impl GatewayConfig {
    pub fn from_env() -> BillingResult<Self> {
        let key_id = std::env::var("RAZORPAY_KEY_ID")
            .map_err(|_| BillingError::Gateway("RAZORPAY_KEY_ID not set".to_string()))?;
        let key_secret = std::env::var("RAZORPAY_KEY_SECRET")
            .map_err(|_| BillingError::Gateway("RAZORPAY_KEY_SECRET not set".to_string()))?;
        let base_url = std::env::var("RAZORPAY_BASE_URL")
            .unwrap_or_else(|_| "https://api.razorpay.com".to_string());
        let currency = std::env::var("CURRENCY").unwrap_or_else(|_| "USD".to_string());

        Ok(Self {
            key_id,
            key_secret,
            base_url,
            currency,
        })
    }
}

/// Settlement state of a gateway order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Attempted,
    Paid,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    /// Whether funds were captured for this order
    pub fn is_settled(&self) -> bool {
        matches!(self, OrderStatus::Paid)
    }
}

/// An order as the gateway reports it
///
/// `receipt` carries the payment intent id we supplied at creation; it is
/// how a settled order is reconciled back to its intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    /// Amount in minor currency units
    pub amount: i64,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: OrderStatus,
}

/// Operations the billing layer needs from a payment gateway
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order for `amount_cents`, tagged with `receipt` for
    /// later reconciliation
    async fn create_order(
        &self,
        amount_cents: i64,
        currency: &str,
        receipt: &str,
    ) -> BillingResult<GatewayOrder>;

    /// Fetch the current state of an order
    async fn fetch_order(&self, order_id: &str) -> BillingResult<GatewayOrder>;
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

/// Live gateway client over HTTPS
#[derive(Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    async fn parse_order(&self, response: reqwest::Response) -> BillingResult<GatewayOrder> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Gateway returned non-success status");
            return Err(BillingError::Gateway(format!(
                "gateway responded with {status}"
            )));
        }

        response
            .json::<GatewayOrder>()
            .await
            .map_err(|e| BillingError::Gateway(format!("malformed gateway response: {e}")))
    }
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    async fn create_order(
        &self,
        amount_cents: i64,
        currency: &str,
        receipt: &str,
    ) -> BillingResult<GatewayOrder> {
        let url = format!("{}/v1/orders", self.config.base_url);
        let body = CreateOrderRequest {
            amount: amount_cents,
            currency,
            receipt,
        };

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to reach payment gateway");
                BillingError::Gateway(e.to_string())
            })?;

        self.parse_order(response).await
    }

    async fn fetch_order(&self, order_id: &str) -> BillingResult<GatewayOrder> {
        let url = format!("{}/v1/orders/{}", self.config.base_url, order_id);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, order_id = %order_id, "Failed to reach payment gateway");
                BillingError::Gateway(e.to_string())
            })?;

        self.parse_order(response).await
    }
}
