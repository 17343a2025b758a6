//! Order lifecycle types
//!
//! An order buys or sells one of the two complementary contracts of a market.

use crate::ids::{AccountId, MarketId, OrderId};
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};

/// Contract traded by an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    YES,
    NO,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::YES, Side::NO];

}

/// Order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Buy order (bid)
    BUY,
    /// Sell order (ask)
    SELL,
}

impl OrderType {
    /// Get the opposite direction
    pub fn opposite(&self) -> Self {
        match self {
            OrderType::BUY => OrderType::SELL,
            OrderType::SELL => OrderType::BUY,
        }
    }
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Waiting in the book, nothing filled
    Resting,
    /// Some quantity filled, remainder in the book
    PartiallyFilled,
    /// Completely matched (terminal)
    Filled,
    /// Removed from the book at resolution (terminal)
    Cancelled,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }
}

/// Complete order structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub market_id: MarketId,
    pub account_id: AccountId,
    pub side: Side,
    pub order_type: OrderType,
    pub price: Price,
    pub quantity: Quantity,
    pub filled_quantity: Quantity,
    pub remaining_quantity: Quantity,
    /// Arrival sequence within the market, used for time priority
    pub sequence: u64,
    pub status: OrderStatus,
    pub created_at: i64, // Unix nanos
    pub updated_at: i64, // Unix nanos
}

impl Order {
    /// Create a new resting order
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        market_id: MarketId,
        account_id: AccountId,
        side: Side,
        order_type: OrderType,
        price: Price,
        quantity: Quantity,
        sequence: u64,
        timestamp: i64,
    ) -> Self {
        Self {
            order_id: OrderId::new(),
            market_id,
            account_id,
            side,
            order_type,
            price,
            quantity,
            filled_quantity: Quantity::zero(),
            remaining_quantity: quantity,
            sequence,
            status: OrderStatus::Resting,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Check quantity invariant: filled + remaining = total
    pub fn check_invariant(&self) -> bool {
        self.filled_quantity + self.remaining_quantity == self.quantity
    }

    /// Check if order is completely filled
    pub fn is_filled(&self) -> bool {
        self.remaining_quantity.is_zero()
    }

    /// Check if order has any fills
    pub fn has_fills(&self) -> bool {
        !self.filled_quantity.is_zero()
    }

    /// Update filled quantity and adjust status
    ///
    /// # Panics
    /// Panics if the fill would exceed remaining quantity
    pub fn add_fill(&mut self, fill_quantity: Quantity, timestamp: i64) {
        self.remaining_quantity = self
            .remaining_quantity
            .checked_sub(fill_quantity)
            .expect("Fill would exceed order quantity");
        self.filled_quantity = self.filled_quantity + fill_quantity;

        self.status = if self.is_filled() {
            OrderStatus::Filled
        } else if self.has_fills() {
            OrderStatus::PartiallyFilled
        } else {
            OrderStatus::Resting
        };
        self.updated_at = timestamp;

        debug_assert!(self.check_invariant(), "Invariant violated after fill");
    }

    /// Cancel the order
    ///
    /// # Panics
    /// Panics if order is already in terminal state
    pub fn cancel(&mut self, timestamp: i64) {
        assert!(!self.status.is_terminal(), "Cannot cancel terminal order");

        self.status = OrderStatus::Cancelled;
        self.updated_at = timestamp;
    }
}
