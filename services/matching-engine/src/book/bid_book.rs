//! Bid (buy-side) book for one contract
//!
//! Maintains buy orders sorted by price descending (best bid first).
//! Uses BTreeMap for deterministic iteration order.

use std::collections::BTreeMap;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};

use super::price_level::{OrderEntry, PriceLevel};

/// Bid (buy) side book
///
/// Orders are sorted by price descending, so the highest bid is first.
/// At each price level, orders are maintained in FIFO order.
#[derive(Debug, Clone, Default)]
pub struct BidBook {
    /// Price levels keyed ascending; the best bid is the last key
    levels: BTreeMap<Price, PriceLevel>,
}

impl BidBook {
    /// Create a new empty bid book
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    /// Insert an order at the back of its price level
    pub fn insert(&mut self, price: Price, entry: OrderEntry) {
        self.levels.entry(price).or_default().insert(entry);
    }

    /// Highest bid and the order at the front of its level
    pub fn best(&self) -> Option<(Price, &OrderEntry)> {
        self.levels
            .iter()
            .next_back()
            .and_then(|(price, level)| level.peek_front().map(|entry| (*price, entry)))
    }

    /// Get the best bid price
    pub fn best_price(&self) -> Option<Price> {
        self.levels.keys().next_back().copied()
    }

    pub fn remaining_at(&self, order_id: &OrderId, price: Price) -> Option<Quantity> {
        self.levels.get(&price)?.remaining_of(order_id)
    }

    /// Reduce a resting order, dropping the level once it empties
    pub fn decrement(&mut self, order_id: &OrderId, price: Price, filled: Quantity) -> Option<Quantity> {
        let level = self.levels.get_mut(&price)?;
        let remaining = level.decrement(order_id, filled)?;
        if level.is_empty() {
            self.levels.remove(&price);
        }
        Some(remaining)
    }

    /// Remove every resting order in priority order
    pub fn drain(&mut self) -> Vec<(Price, OrderEntry)> {
        let levels = std::mem::take(&mut self.levels);
        levels
            .into_iter()
            .rev()
            .flat_map(|(price, mut level)| level.drain().map(|entry| (price, entry)).collect::<Vec<_>>())
            .collect()
    }

    /// Resting orders in priority order (price descending, then arrival)
    pub fn iter(&self) -> impl Iterator<Item = (Price, &OrderEntry)> {
        self.levels
            .iter()
            .rev()
            .flat_map(|(price, level)| level.iter().map(move |entry| (*price, entry)))
    }

    /// Get depth snapshot (top N price levels)
    pub fn depth_snapshot(&self, depth: usize) -> Vec<(Price, Quantity)> {
        self.levels
            .iter()
            .rev() // Reverse to get highest prices first
            .take(depth)
            .map(|(price, level)| (*price, level.total_quantity()))
            .collect()
    }

    /// Check if the bid book is empty
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
