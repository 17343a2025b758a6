//! Engine configuration

use crate::matching::SelfTradePolicy;

/// Largest quantity a single order or issuance may carry by default
pub const DEFAULT_MAX_ORDER_QUANTITY: u64 = 1_000_000;

/// Per-market engine settings, shared by every market of a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub self_trade_policy: SelfTradePolicy,
    pub max_order_quantity: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            self_trade_policy: SelfTradePolicy::Allow,
            max_order_quantity: DEFAULT_MAX_ORDER_QUANTITY,
        }
    }
}

impl EngineConfig {
    pub fn with_self_trade_policy(mut self, policy: SelfTradePolicy) -> Self {
        self.self_trade_policy = policy;
        self
    }

    pub fn with_max_order_quantity(mut self, max: u64) -> Self {
        self.max_order_quantity = max;
        self
    }
}
