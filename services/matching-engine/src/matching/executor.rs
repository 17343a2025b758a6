//! Trade execution logic
//!
//! Stamps every fill with a market-wide monotonic sequence number.

use types::ids::MarketId;
use types::numeric::Quantity;
use types::order::Order;
use types::trade::Trade;

use crate::book::RestingOrder;

/// Match executor for handling trade generation
#[derive(Debug, Clone)]
pub struct MatchExecutor {
    sequence_counter: u64,
}

impl MatchExecutor {
    /// Create a new match executor with starting sequence number
    pub fn new(starting_sequence: u64) -> Self {
        Self {
            sequence_counter: starting_sequence,
        }
    }

    /// Get next sequence number (monotonically increasing)
    fn next_sequence(&mut self) -> u64 {
        let seq = self.sequence_counter;
        self.sequence_counter += 1;
        seq
    }

    /// Build the trade between a resting maker and an incoming taker
    ///
    /// Execution price is always the maker's resting price.
    pub fn execute_trade(
        &mut self,
        market_id: MarketId,
        maker: &RestingOrder,
        taker: &Order,
        quantity: Quantity,
        timestamp: i64,
    ) -> Trade {
        debug_assert_eq!(maker.side, taker.side, "maker and taker must trade the same contract");
        let sequence = self.next_sequence();

        Trade::new(
            sequence,
            market_id,
            taker.side,
            maker.order_id,
            taker.order_id,
            maker.account_id,
            taker.account_id,
            taker.order_type,
            maker.price,
            quantity,
            timestamp,
        )
    }

    /// Sequence the next trade will receive
    pub fn peek_sequence(&self) -> u64 {
        self.sequence_counter
    }
}
