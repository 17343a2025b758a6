//! Trade execution types
//!
//! Trades are immutable and append-only. Their prices and quantities are
//! what the position ledger consumes.

use crate::ids::{AccountId, MarketId, OrderId, TradeId};
use crate::numeric::{Price, Quantity};
use crate::order::{OrderType, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Complete trade structure
///
/// Represents one fill between a resting maker and an incoming taker on the
/// same contract of the same market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: TradeId,
    pub sequence: u64, // Monotonic within the market
    pub market_id: MarketId,
    pub side: Side,

    // Order references
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,

    // Account references
    pub maker_account_id: AccountId,
    pub taker_account_id: AccountId,

    /// Direction of the taker
    pub taker_type: OrderType,
    /// Maker's resting price
    pub price: Price,
    pub quantity: Quantity,

    pub executed_at: i64, // Unix nanos
}

impl Trade {
    /// Create a new trade
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: u64,
        market_id: MarketId,
        side: Side,
        maker_order_id: OrderId,
        taker_order_id: OrderId,
        maker_account_id: AccountId,
        taker_account_id: AccountId,
        taker_type: OrderType,
        price: Price,
        quantity: Quantity,
        executed_at: i64,
    ) -> Self {
        Self {
            trade_id: TradeId::new(),
            sequence,
            market_id,
            side,
            maker_order_id,
            taker_order_id,
            maker_account_id,
            taker_account_id,
            taker_type,
            price,
            quantity,
            executed_at,
        }
    }

    /// Account that received the contracts
    pub fn buyer(&self) -> AccountId {
        match self.taker_type {
            OrderType::BUY => self.taker_account_id,
            OrderType::SELL => self.maker_account_id,
        }
    }

    /// Account that delivered the contracts
    pub fn seller(&self) -> AccountId {
        match self.taker_type {
            OrderType::BUY => self.maker_account_id,
            OrderType::SELL => self.taker_account_id,
        }
    }

    /// Calculate trade value (price × quantity)
    pub fn trade_value(&self) -> Decimal {
        self.quantity.as_decimal() * self.price.as_decimal()
    }

    pub fn is_self_trade(&self) -> bool {
        self.maker_account_id == self.taker_account_id
    }
}
