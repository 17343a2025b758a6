//! Ask (sell-side) book for one contract
//!
//! Maintains sell orders sorted by price ascending (best ask first).
//! Uses BTreeMap for deterministic iteration order.

use std::collections::BTreeMap;
use types::ids::{AccountId, OrderId};
use types::numeric::{Price, Quantity};

use super::price_level::{OrderEntry, PriceLevel};

/// Ask (sell) side book
///
/// Orders are sorted by price ascending, so the lowest ask is first.
/// At each price level, orders are maintained in FIFO order.
#[derive(Debug, Clone, Default)]
pub struct AskBook {
    /// Price levels sorted ascending (lowest price first)
    levels: BTreeMap<Price, PriceLevel>,
}

impl AskBook {
    /// Create a new empty ask book
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    /// Insert an order at the back of its price level
    pub fn insert(&mut self, price: Price, entry: OrderEntry) {
        self.levels.entry(price).or_default().insert(entry);
    }

    /// Lowest ask and the order at the front of its level
    pub fn best(&self) -> Option<(Price, &OrderEntry)> {
        // BTreeMap iter is ascending, so next() gives us lowest price
        self.levels
            .iter()
            .next()
            .and_then(|(price, level)| level.peek_front().map(|entry| (*price, entry)))
    }

    /// Get the best ask price
    pub fn best_price(&self) -> Option<Price> {
        self.levels.keys().next().copied()
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
            .flat_map(|(price, mut level)| level.drain().map(|entry| (price, entry)).collect::<Vec<_>>())
            .collect()
    }

    /// Resting orders in priority order (price ascending, then arrival)
    pub fn iter(&self) -> impl Iterator<Item = (Price, &OrderEntry)> {
        self.levels
            .iter()
            .flat_map(|(price, level)| level.iter().map(move |entry| (*price, entry)))
    }

    /// Contracts an account has already offered on this book
    pub fn committed_quantity(&self, account_id: &AccountId) -> Quantity {
        self.iter()
            .filter(|(_, entry)| &entry.account_id == account_id)
            .fold(Quantity::zero(), |total, (_, entry)| total + entry.remaining_quantity)
    }

    /// Get depth snapshot (top N price levels)
    pub fn depth_snapshot(&self, depth: usize) -> Vec<(Price, Quantity)> {
        self.levels
            .iter()
            .take(depth)
            .map(|(price, level)| (*price, level.total_quantity()))
            .collect()
    }

    /// Check if the ask book is empty
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
