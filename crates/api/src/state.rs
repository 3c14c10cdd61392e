//! Application state

use sqlx::PgPool;
use std::sync::Arc;

use pixa_billing::{GatewayConfig, HttpGateway, OrderService};

use crate::{
    auth::{AuthState, JwtManager},
    config::Config,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub jwt_manager: JwtManager,
    pub orders: Arc<OrderService<HttpGateway>>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> anyhow::Result<Self> {
        let jwt_manager = JwtManager::new(&config.jwt_secret, config.jwt_expiry_hours);

        let gateway_config = GatewayConfig::from_env()
            .map_err(|e| anyhow::anyhow!("payment gateway not configured: {e}"))?;
        let currency = gateway_config.currency.clone();
        tracing::info!(
            gateway = %gateway_config.base_url,
            currency = %currency,
            "Payment gateway client initialized"
        );

        let gateway = HttpGateway::new(gateway_config);
        let orders = Arc::new(OrderService::new(pool.clone(), gateway, currency));

        Ok(Self {
            pool,
            config,
            jwt_manager,
            orders,
        })
    }

    /// Get auth state for middleware
    pub fn auth_state(&self) -> AuthState {
        AuthState {
            jwt_manager: self.jwt_manager.clone(),
        }
    }
}
