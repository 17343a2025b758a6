//! Position tracking types
//!
//! One entry per market × account × contract. Quantity never goes negative;
//! the average price is meaningless (reported as 0) while flat.

use crate::ids::{AccountId, MarketId};
use crate::numeric::Quantity;
use crate::order::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Position entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionEntry {
    pub market_id: MarketId,
    pub account_id: AccountId,
    pub side: Side,
    pub quantity: Quantity,
    /// Weighted cost basis per contract held
    pub average_price: Decimal,
    /// Profit or loss locked in by sells and settlement
    pub realized_pnl: Decimal,
    pub updated_at: i64,
}

impl PositionEntry {
    /// Create an empty entry; entries are created lazily on first fill
    pub fn new(market_id: MarketId, account_id: AccountId, side: Side, timestamp: i64) -> Self {
        Self {
            market_id,
            account_id,
            side,
            quantity: Quantity::zero(),
            average_price: Decimal::ZERO,
            realized_pnl: Decimal::ZERO,
            updated_at: timestamp,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.quantity.is_zero()
    }

    /// Add contracts at `price`, recomputing the weighted average cost
    pub fn apply_buy(&mut self, price: Decimal, quantity: Quantity, timestamp: i64) {
        let new_qty = self.quantity + quantity;
        self.average_price = if self.is_flat() {
            price
        } else {
            (self.quantity.as_decimal() * self.average_price + quantity.as_decimal() * price)
                / new_qty.as_decimal()
        };
        self.quantity = new_qty;
        self.updated_at = timestamp;
    }

    /// Remove contracts at `price`, realizing `(price - avg) × qty`
    ///
    /// Returns the realized amount, or None (entry untouched) if the entry
    /// holds fewer than `quantity` contracts.
    pub fn apply_sell(&mut self, price: Decimal, quantity: Quantity, timestamp: i64) -> Option<Decimal> {
        let new_qty = self.quantity.checked_sub(quantity)?;
        let realized = (price - self.average_price) * quantity.as_decimal();
        self.realized_pnl += realized;
        self.quantity = new_qty;
        if self.is_flat() {
            self.average_price = Decimal::ZERO;
        }
        self.updated_at = timestamp;
        Some(realized)
    }
}
