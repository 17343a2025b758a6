//! Order book infrastructure module
//!
//! One [`OrderBook`] exists per market × contract. It holds a bid book and an
//! ask book and never matches anything itself; the matching loop lives in
//! [`crate::engine`].

pub mod price_level;
pub mod bid_book;
pub mod ask_book;

pub use price_level::{OrderEntry, PriceLevel};
pub use bid_book::BidBook;
pub use ask_book::AskBook;

use types::ids::{AccountId, OrderId};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderType, Side};

/// Owned view of one resting order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestingOrder {
    pub order_id: OrderId,
    pub account_id: AccountId,
    pub side: Side,
    pub order_type: OrderType,
    pub price: Price,
    pub remaining_quantity: Quantity,
    pub sequence: u64,
}

impl RestingOrder {
    fn from_entry(side: Side, order_type: OrderType, price: Price, entry: &OrderEntry) -> Self {
        Self {
            order_id: entry.order_id,
            account_id: entry.account_id,
            side,
            order_type,
            price,
            remaining_quantity: entry.remaining_quantity,
            sequence: entry.sequence,
        }
    }
}

/// Book failures are always bookkeeping bugs, never user errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    /// Order is not resting at the given price
    OrderNotFound(OrderId),
    /// Fill larger than the order's remaining quantity
    Overfill { order_id: OrderId, filled: Quantity },
}

impl std::fmt::Display for BookError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookError::OrderNotFound(order_id) => write!(f, "order {} is not resting", order_id),
            BookError::Overfill { order_id, filled } => {
                write!(f, "fill of {} exceeds remaining quantity of order {}", filled, order_id)
            }
        }
    }
}

/// Resting limit orders for one contract of one market
#[derive(Debug, Clone)]
pub struct OrderBook {
    side: Side,
    bids: BidBook,
    asks: AskBook,
}

impl OrderBook {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            bids: BidBook::new(),
            asks: AskBook::new(),
        }
    }

    /// Highest-priced, earliest BUY
    pub fn best_buy(&self) -> Option<RestingOrder> {
        self.bids
            .best()
            .map(|(price, entry)| RestingOrder::from_entry(self.side, OrderType::BUY, price, entry))
    }

    /// Lowest-priced, earliest SELL
    pub fn best_sell(&self) -> Option<RestingOrder> {
        self.asks
            .best()
            .map(|(price, entry)| RestingOrder::from_entry(self.side, OrderType::SELL, price, entry))
    }

    /// Best resting order an incoming order of `incoming` type would meet
    pub fn best_opposite(&self, incoming: OrderType) -> Option<RestingOrder> {
        match incoming {
            OrderType::BUY => self.best_sell(),
            OrderType::SELL => self.best_buy(),
        }
    }

    /// Place the unfilled remainder of `order` at the back of its level
    pub fn insert_resting(&mut self, order: &Order) {
        debug_assert_eq!(order.side, self.side, "order routed to the wrong contract book");
        let entry = OrderEntry {
            order_id: order.order_id,
            account_id: order.account_id,
            sequence: order.sequence,
            remaining_quantity: order.remaining_quantity,
        };
        match order.order_type {
            OrderType::BUY => self.bids.insert(order.price, entry),
            OrderType::SELL => self.asks.insert(order.price, entry),
        }
    }

    /// Confirm `resting` still rests at its price with at least `filled` left
    pub fn check_fill(&self, resting: &RestingOrder, filled: Quantity) -> Result<(), BookError> {
        let remaining = match resting.order_type {
            OrderType::BUY => self.bids.remaining_at(&resting.order_id, resting.price),
            OrderType::SELL => self.asks.remaining_at(&resting.order_id, resting.price),
        };
        match remaining {
            None => Err(BookError::OrderNotFound(resting.order_id)),
            Some(remaining) if remaining < filled => Err(BookError::Overfill {
                order_id: resting.order_id,
                filled,
            }),
            Some(_) => Ok(()),
        }
    }

    /// Apply a fill to a resting order, removing it once fully consumed
    ///
    /// Returns the order's remaining quantity after the fill. A rejected fill
    /// leaves the book unchanged.
    pub fn remove_or_decrement(&mut self, resting: &RestingOrder, filled: Quantity) -> Result<Quantity, BookError> {
        self.check_fill(resting, filled)?;
        let outcome = match resting.order_type {
            OrderType::BUY => self.bids.decrement(&resting.order_id, resting.price, filled),
            OrderType::SELL => self.asks.decrement(&resting.order_id, resting.price, filled),
        };
        outcome.ok_or(BookError::OrderNotFound(resting.order_id))
    }

    /// Remove every resting order from both sides of the book
    pub fn cancel_all(&mut self) -> Vec<RestingOrder> {
        let side = self.side;
        let mut cancelled: Vec<RestingOrder> = self
            .bids
            .drain()
            .into_iter()
            .map(|(price, entry)| RestingOrder::from_entry(side, OrderType::BUY, price, &entry))
            .collect();
        cancelled.extend(
            self.asks
                .drain()
                .into_iter()
                .map(|(price, entry)| RestingOrder::from_entry(side, OrderType::SELL, price, &entry)),
        );
        cancelled
    }

    /// All resting orders: BUYs by priority, then SELLs by priority
    pub fn resting_orders(&self) -> Vec<RestingOrder> {
        let side = self.side;
        self.bids
            .iter()
            .map(|(price, entry)| RestingOrder::from_entry(side, OrderType::BUY, price, entry))
            .chain(
                self.asks
                    .iter()
                    .map(|(price, entry)| RestingOrder::from_entry(side, OrderType::SELL, price, entry)),
            )
            .collect()
    }

    /// Contracts `account_id` has already offered for sale on this book
    pub fn committed_sell_quantity(&self, account_id: &AccountId) -> Quantity {
        self.asks.committed_quantity(account_id)
    }

    /// Aggregated (price, quantity) levels, best first
    pub fn depth(&self, depth: usize) -> (Vec<(Price, Quantity)>, Vec<(Price, Quantity)>) {
        (self.bids.depth_snapshot(depth), self.asks.depth_snapshot(depth))
    }

    /// True when the best bid is at or above the best ask
    pub fn is_crossed(&self) -> bool {
        match (self.bids.best_price(), self.asks.best_price()) {
            (Some(bid), Some(ask)) => bid >= ask,
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}
