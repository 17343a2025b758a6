//! Runtime configuration loaded from the environment
//!
//! A `.env` file is read first (see `main`); real environment variables win.

use anyhow::{Context, Result};
use matching_engine::config::DEFAULT_MAX_ORDER_QUANTITY;
use matching_engine::{EngineConfig, SelfTradePolicy};
use std::env;
use std::net::SocketAddr;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_APP_ENV: &str = "development";

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub app_env: String,
    pub engine: EngineConfig,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind_addr = lookup("GATEWAY_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("GATEWAY_BIND_ADDR must be a socket address like 0.0.0.0:8000")?;

        let self_trade_policy = match lookup("SELF_TRADE_POLICY") {
            Some(value) => value
                .parse::<SelfTradePolicy>()
                .map_err(anyhow::Error::msg)
                .context("SELF_TRADE_POLICY must be 'allow' or 'reject'")?,
            None => SelfTradePolicy::default(),
        };

        let max_order_quantity = match lookup("MAX_ORDER_QUANTITY") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|max| *max > 0)
                .context("MAX_ORDER_QUANTITY must be a positive integer")?,
            None => DEFAULT_MAX_ORDER_QUANTITY,
        };

        Ok(Self {
            bind_addr,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            app_env: lookup("APP_ENV").unwrap_or_else(|| DEFAULT_APP_ENV.to_string()),
            engine: EngineConfig::default()
                .with_self_trade_policy(self_trade_policy)
                .with_max_order_quantity(max_order_quantity),
        })
    }
}
