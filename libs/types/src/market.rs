//! Market lifecycle types
//!
//! A market asks one binary question. Its YES and NO prices are complements
//! at every observable instant: `yes_price + no_price == 100`.

use crate::ids::MarketId;
use crate::numeric::Price;
use crate::order::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Market status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarketStatus {
    /// Accepting orders
    OPEN,
    /// Outcome fixed, positions settled (terminal)
    RESOLVED,
}

/// Resolved outcome of a market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    YES,
    NO,
}

impl Outcome {
    /// The contract that pays 100 under this outcome
    pub fn winning_side(&self) -> Side {
        match self {
            Outcome::YES => Side::YES,
            Outcome::NO => Side::NO,
        }
    }
}

/// Market record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub id: MarketId,
    pub slug: String,
    pub question: String,
    pub description: Option<String>,
    pub status: MarketStatus,
    pub outcome: Option<Outcome>,
    pub yes_price: Price,
    pub no_price: Price,
    pub created_at: i64, // Unix nanos
    pub updated_at: i64, // Unix nanos
}

impl Market {
    /// Create an open market priced at `initial_yes_price`
    ///
    /// Range validation is the registry's job; this only derives NO.
    pub fn new(
        id: MarketId,
        slug: String,
        question: String,
        description: Option<String>,
        initial_yes_price: Price,
        timestamp: i64,
    ) -> Self {
        Self {
            id,
            slug,
            question,
            description,
            status: MarketStatus::OPEN,
            outcome: None,
            yes_price: initial_yes_price,
            no_price: initial_yes_price.complement(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == MarketStatus::OPEN
    }

    /// Record a trade on `side` at `price`; the other side takes the complement
    pub fn apply_trade_price(&mut self, side: Side, price: Price, timestamp: i64) {
        match side {
            Side::YES => {
                self.yes_price = price;
                self.no_price = price.complement();
            }
            Side::NO => {
                self.no_price = price;
                self.yes_price = price.complement();
            }
        }
        self.updated_at = timestamp;
    }

    /// Terminal transition: the winning side is frozen at 100, the loser at 0
    pub fn freeze(&mut self, outcome: Outcome, timestamp: i64) {
        self.status = MarketStatus::RESOLVED;
        self.outcome = Some(outcome);
        let (yes, no) = match outcome {
            Outcome::YES => (Price::HUNDRED, Price::ZERO),
            Outcome::NO => (Price::ZERO, Price::HUNDRED),
        };
        self.yes_price = yes;
        self.no_price = no;
        self.updated_at = timestamp;
    }

    /// Check the complement invariant
    pub fn check_invariant(&self) -> bool {
        self.yes_price.as_decimal() + self.no_price.as_decimal() == Decimal::ONE_HUNDRED
    }
}

/// Settlement record kept once a market resolves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub market_id: MarketId,
    pub outcome: Outcome,
    /// Cash paid to all YES holders
    pub payout_yes: Decimal,
    /// Cash paid to all NO holders
    pub payout_no: Decimal,
    pub resolved_at: i64,
}
