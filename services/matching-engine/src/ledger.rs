//! Position ledger
//!
//! One partition per market, keyed by account × contract. Buys move the
//! weighted average cost, sells realize `(price - avg) × qty`, settlement
//! pays 100 or 0 per contract and flattens everything.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::error;
use types::errors::{EngineError, EngineResult};
use types::ids::{AccountId, MarketId};
use types::market::Outcome;
use types::numeric::{Price, Quantity};
use types::order::Side;
use types::position::PositionEntry;
use types::trade::Trade;

/// Cash paid out by a settlement, per contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Payout {
    pub yes: Decimal,
    pub no: Decimal,
}

/// Position entries of one market
#[derive(Debug, Clone)]
pub struct PositionLedger {
    market_id: MarketId,
    /// BTreeMap keeps settlement and listings in a deterministic order
    entries: BTreeMap<(AccountId, Side), PositionEntry>,
}

impl PositionLedger {
    pub fn new(market_id: MarketId) -> Self {
        Self {
            market_id,
            entries: BTreeMap::new(),
        }
    }

    /// Contracts of `side` held by `account_id`
    pub fn quantity(&self, account_id: &AccountId, side: Side) -> Quantity {
        self.entries
            .get(&(*account_id, side))
            .map(|entry| entry.quantity)
            .unwrap_or_default()
    }

    pub fn entry(&self, account_id: &AccountId, side: Side) -> Option<&PositionEntry> {
        self.entries.get(&(*account_id, side))
    }

    /// Book one trade against the buying and selling accounts
    ///
    /// All-or-nothing: the seller's holding is checked before either entry
    /// changes. The seller leg is applied first so a self-trade realizes
    /// against the cost basis held before the fill.
    pub fn apply_trade(&mut self, trade: &Trade, buyer: AccountId, seller: AccountId) -> EngineResult<()> {
        let held = self.quantity(&seller, trade.side);
        if held < trade.quantity {
            return Err(EngineError::InsufficientInventory {
                required: trade.quantity.value(),
                available: held.value(),
            });
        }

        let price = trade.price.as_decimal();
        let seller_entry = self
            .entries
            .get_mut(&(seller, trade.side))
            .ok_or_else(|| EngineError::InvariantViolation("seller entry vanished".to_string()))?;
        if seller_entry.apply_sell(price, trade.quantity, trade.executed_at).is_none() {
            error!(market_id = %self.market_id, account_id = %seller, "sell leg refused after inventory check");
            return Err(EngineError::InvariantViolation("sell leg refused after inventory check".to_string()));
        }

        self.entry_mut(buyer, trade.side, trade.executed_at)
            .apply_buy(price, trade.quantity, trade.executed_at);
        Ok(())
    }

    /// Credit freshly issued contracts at `price`
    pub fn credit(&mut self, account_id: AccountId, side: Side, price: Price, quantity: Quantity, timestamp: i64) {
        self.entry_mut(account_id, side, timestamp)
            .apply_buy(price.as_decimal(), quantity, timestamp);
    }

    /// Entries of one account, YES before NO
    pub fn positions(&self, account_id: &AccountId) -> Vec<PositionEntry> {
        Side::ALL
            .iter()
            .filter_map(|side| self.entries.get(&(*account_id, *side)).cloned())
            .collect()
    }

    /// Every entry of the market, ordered by account then contract
    pub fn all_positions(&self) -> impl Iterator<Item = &PositionEntry> {
        self.entries.values()
    }

    /// Pay out every entry for `outcome` and flatten it
    ///
    /// Winning contracts pay 100, losing ones 0; the difference to the cost
    /// basis is realized. New entries are computed in full before any is
    /// written, so an arithmetic failure leaves the ledger untouched.
    pub fn settle(&mut self, outcome: Outcome, timestamp: i64) -> EngineResult<Payout> {
        let winner = outcome.winning_side();
        let mut payout = Payout::default();
        let mut settled = Vec::with_capacity(self.entries.len());

        for (key, entry) in &self.entries {
            let value = if entry.side == winner {
                Decimal::ONE_HUNDRED
            } else {
                Decimal::ZERO
            };
            let qty = entry.quantity.as_decimal();
            let realized = (value - entry.average_price)
                .checked_mul(qty)
                .and_then(|pnl| entry.realized_pnl.checked_add(pnl));
            let cash = value.checked_mul(qty);
            let (Some(realized_pnl), Some(cash)) = (realized, cash) else {
                error!(market_id = %self.market_id, account_id = %entry.account_id, "settlement arithmetic overflow");
                return Err(EngineError::InvariantViolation("settlement arithmetic overflow".to_string()));
            };

            match entry.side {
                Side::YES => payout.yes += cash,
                Side::NO => payout.no += cash,
            }

            let mut finalized = entry.clone();
            finalized.realized_pnl = realized_pnl;
            finalized.quantity = Quantity::zero();
            finalized.average_price = Decimal::ZERO;
            finalized.updated_at = timestamp;
            settled.push((*key, finalized));
        }

        for (key, finalized) in settled {
            self.entries.insert(key, finalized);
        }
        Ok(payout)
    }

    fn entry_mut(&mut self, account_id: AccountId, side: Side, timestamp: i64) -> &mut PositionEntry {
        let market_id = self.market_id;
        self.entries
            .entry((account_id, side))
            .or_insert_with(|| PositionEntry::new(market_id, account_id, side, timestamp))
    }
}
