//! Price level implementation with FIFO queue
//!
//! A price level contains all resting orders at one price. Orders keep strict
//! arrival order; a partial fill reduces the front entry in place and never
//! moves it to the back.

use std::collections::VecDeque;
use types::ids::{AccountId, OrderId};
use types::numeric::Quantity;

/// Entry in the price level queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderEntry {
    pub order_id: OrderId,
    pub account_id: AccountId,
    pub sequence: u64,
    pub remaining_quantity: Quantity,
}

/// A price level containing orders at a specific price
#[derive(Debug, Clone)]
pub struct PriceLevel {
    /// Queue of orders at this price level (FIFO order)
    orders: VecDeque<OrderEntry>,
    /// Total quantity available at this level
    total_quantity: Quantity,
}

impl PriceLevel {
    /// Create a new empty price level
    pub fn new() -> Self {
        Self {
            orders: VecDeque::new(),
            total_quantity: Quantity::zero(),
        }
    }

    /// Insert an order at the back of the queue (time priority)
    pub fn insert(&mut self, entry: OrderEntry) {
        debug_assert!(
            self.orders.back().map_or(true, |last| last.sequence < entry.sequence),
            "arrival sequence must increase within a level"
        );
        self.total_quantity = self.total_quantity + entry.remaining_quantity;
        self.orders.push_back(entry);
    }

    /// Peek at the front order without removing it
    pub fn peek_front(&self) -> Option<&OrderEntry> {
        self.orders.front()
    }

    /// Remaining quantity of `order_id`, if it rests here
    pub fn remaining_of(&self, order_id: &OrderId) -> Option<Quantity> {
        self.orders
            .iter()
            .find(|entry| &entry.order_id == order_id)
            .map(|entry| entry.remaining_quantity)
    }

    /// Reduce an order's remaining quantity by `filled`
    ///
    /// The order is removed once nothing remains. Returns the new remaining
    /// quantity, or None if the order is absent or smaller than `filled`.
    pub fn decrement(&mut self, order_id: &OrderId, filled: Quantity) -> Option<Quantity> {
        let position = self.orders.iter().position(|entry| &entry.order_id == order_id)?;
        let entry = &mut self.orders[position];
        let remaining = entry.remaining_quantity.checked_sub(filled)?;
        entry.remaining_quantity = remaining;
        self.total_quantity = self.total_quantity.saturating_sub(filled);

        if remaining.is_zero() {
            self.orders.remove(position);
        }
        Some(remaining)
    }

    /// Remove every order, front first
    pub fn drain(&mut self) -> impl Iterator<Item = OrderEntry> + '_ {
        self.total_quantity = Quantity::zero();
        self.orders.drain(..)
    }

    /// Orders in time priority
    pub fn iter(&self) -> impl Iterator<Item = &OrderEntry> {
        self.orders.iter()
    }

    /// Check if the price level is empty
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Get the total quantity at this price level
    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }
}

impl Default for PriceLevel {
    fn default() -> Self {
        Self::new()
    }
}
