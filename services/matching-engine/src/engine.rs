//! Matching engine core
//!
//! A [`MarketEngine`] owns everything of one market that mutates together:
//! the market record, one order book per contract, the position ledger, the
//! order history and the trade log. It is plain synchronous state; callers
//! serialize access to it (see [`crate::registry`]).

use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;
use tracing::{debug, error};
use types::errors::{EngineError, EngineResult};
use types::ids::{AccountId, OrderId};
use types::market::{Market, Resolution};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderType, Side};
use types::position::PositionEntry;
use types::trade::Trade;

use crate::book::{OrderBook, RestingOrder};
use crate::config::EngineConfig;
use crate::ledger::PositionLedger;
use crate::matching::{crosses, MatchExecutor};

/// Limit order as submitted, before validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderRequest {
    pub account_id: AccountId,
    pub side: Side,
    pub order_type: OrderType,
    pub price: Price,
    pub quantity: Quantity,
}

impl OrderRequest {
    /// Order booked against the implicit account
    pub fn new(side: Side, order_type: OrderType, price: Price, quantity: Quantity) -> Self {
        Self {
            account_id: AccountId::implicit(),
            side,
            order_type,
            price,
            quantity,
        }
    }

    pub fn for_account(mut self, account_id: AccountId) -> Self {
        self.account_id = account_id;
        self
    }
}

/// Result of submitting an order
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitResult {
    /// The incoming order in its final state
    pub order: Order,
    /// Trades in execution order, possibly empty
    pub trades: Vec<Trade>,
}

impl SubmitResult {
    /// Quantity-weighted execution price, None when nothing filled
    pub fn average_fill_price(&self) -> Option<Decimal> {
        let filled: Decimal = self.trades.iter().map(|t| t.quantity.as_decimal()).sum();
        if filled.is_zero() {
            return None;
        }
        let value: Decimal = self.trades.iter().map(Trade::trade_value).sum();
        Some(value / filled)
    }
}

/// Order books, ledger and history of a single market
#[derive(Debug, Clone)]
pub struct MarketEngine {
    pub(crate) market: Market,
    config: EngineConfig,
    yes_book: OrderBook,
    no_book: OrderBook,
    pub(crate) ledger: PositionLedger,
    pub(crate) orders: HashMap<OrderId, Order>,
    trades: Vec<Trade>,
    executor: MatchExecutor,
    next_order_sequence: u64,
    pub(crate) resolution: Option<Resolution>,
}

impl MarketEngine {
    pub fn new(market: Market, config: EngineConfig) -> Self {
        let ledger = PositionLedger::new(market.id);
        Self {
            market,
            config,
            yes_book: OrderBook::new(Side::YES),
            no_book: OrderBook::new(Side::NO),
            ledger,
            orders: HashMap::new(),
            trades: Vec::new(),
            executor: MatchExecutor::new(1),
            next_order_sequence: 1,
            resolution: None,
        }
    }

    /// Validate, match and rest an incoming limit order
    ///
    /// Every check runs before anything changes. Matching then consumes the
    /// best crossing orders of the opposite type on the same contract's book,
    /// each fill at the resting order's price, and the remainder rests.
    pub fn submit(&mut self, request: OrderRequest, timestamp: i64) -> EngineResult<SubmitResult> {
        if let Err(err) = self.validate(&request) {
            debug!(
                market_id = %self.market.id,
                side = ?request.side,
                order_type = ?request.order_type,
                price = %request.price,
                quantity = %request.quantity,
                error = %err,
                "order rejected"
            );
            return Err(err);
        }

        let sequence = self.next_order_sequence;
        self.next_order_sequence += 1;
        let mut order = Order::new(
            self.market.id,
            request.account_id,
            request.side,
            request.order_type,
            request.price,
            request.quantity,
            sequence,
            timestamp,
        );

        let matched = self.match_order(&mut order, timestamp);
        if matched.is_ok() && !order.is_filled() {
            self.book_mut(order.side).insert_resting(&order);
            debug!(
                market_id = %self.market.id,
                order_id = %order.order_id,
                price = %order.price,
                quantity = %order.remaining_quantity,
                "order resting"
            );
        }
        self.orders.insert(order.order_id, order.clone());

        Ok(SubmitResult {
            order,
            trades: matched?,
        })
    }

    /// Credit `quantity` YES and `quantity` NO contracts to `account_id`
    ///
    /// Each leg is booked at the market's current price of that contract, so
    /// a complete set costs exactly 100 and settles to zero P&L.
    pub fn issue_complete_set(
        &mut self,
        account_id: AccountId,
        quantity: Quantity,
        timestamp: i64,
    ) -> EngineResult<Vec<PositionEntry>> {
        if !self.market.is_open() {
            return Err(EngineError::MarketClosed);
        }
        self.validate_quantity(quantity)?;

        self.ledger
            .credit(account_id, Side::YES, self.market.yes_price, quantity, timestamp);
        self.ledger
            .credit(account_id, Side::NO, self.market.no_price, quantity, timestamp);
        debug!(market_id = %self.market.id, account_id = %account_id, quantity = %quantity, "complete sets issued");

        Ok(self.ledger.positions(&account_id))
    }

    /// Contracts of `side` the account may still offer for sale
    pub fn available_inventory(&self, account_id: &AccountId, side: Side) -> Quantity {
        self.ledger
            .quantity(account_id, side)
            .saturating_sub(self.book(side).committed_sell_quantity(account_id))
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn book(&self, side: Side) -> &OrderBook {
        match side {
            Side::YES => &self.yes_book,
            Side::NO => &self.no_book,
        }
    }

    /// Every resting order: YES book before NO, BUYs before SELLs, then priority
    pub fn order_book(&self) -> Vec<RestingOrder> {
        let mut resting = self.yes_book.resting_orders();
        resting.extend(self.no_book.resting_orders());
        resting
    }

    pub fn positions(&self, account_id: &AccountId) -> Vec<PositionEntry> {
        self.ledger.positions(account_id)
    }

    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    /// Executed trades in execution order
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Any order ever accepted by this market
    pub fn order(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.get(order_id)
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    pub(crate) fn books_mut(&mut self) -> [&mut OrderBook; 2] {
        [&mut self.yes_book, &mut self.no_book]
    }

    fn book_mut(&mut self, side: Side) -> &mut OrderBook {
        match side {
            Side::YES => &mut self.yes_book,
            Side::NO => &mut self.no_book,
        }
    }

    fn validate(&self, request: &OrderRequest) -> EngineResult<()> {
        if !self.market.is_open() {
            return Err(EngineError::MarketClosed);
        }
        if !request.price.is_valid_order_price() {
            return Err(EngineError::invalid("Price must be between 1 and 99."));
        }
        self.validate_quantity(request.quantity)?;

        if request.order_type == OrderType::SELL {
            let available = self.available_inventory(&request.account_id, request.side);
            if available < request.quantity {
                return Err(EngineError::InsufficientInventory {
                    required: request.quantity.value(),
                    available: available.value(),
                });
            }
        }

        self.config.self_trade_policy.check(
            self.book(request.side),
            &request.account_id,
            request.order_type,
            request.price,
            request.quantity,
        )
    }

    fn validate_quantity(&self, quantity: Quantity) -> EngineResult<()> {
        if quantity.is_zero() || quantity.value() > self.config.max_order_quantity {
            return Err(EngineError::invalid(format!(
                "Quantity must be between 1 and {}.",
                self.config.max_order_quantity
            )));
        }
        Ok(())
    }

    /// Run the matching loop for `order` against its contract's book
    ///
    /// Each iteration decides one fill and applies it to the ledger, the
    /// book, both orders and the market price before the next one starts.
    /// Every check a fill depends on runs before the first write, so a
    /// refused fill leaves all of them untouched.
    fn match_order(&mut self, order: &mut Order, timestamp: i64) -> EngineResult<Vec<Trade>> {
        let Self {
            market,
            yes_book,
            no_book,
            ledger,
            orders,
            trades: trade_log,
            executor,
            ..
        } = self;
        let book = match order.side {
            Side::YES => yes_book,
            Side::NO => no_book,
        };
        let mut trades = Vec::new();

        while !order.is_filled() {
            let Some(maker) = book.best_opposite(order.order_type) else {
                break;
            };
            if !crosses(order.order_type, order.price, maker.price) {
                break;
            }

            let fill = order.remaining_quantity.min(maker.remaining_quantity);
            let maker_order = orders
                .get_mut(&maker.order_id)
                .ok_or_else(|| invariant_violation(market, format!("resting order {} has no history", maker.order_id)))?;
            if maker_order.remaining_quantity < fill {
                let what = format!(
                    "resting order {} has {} left, book fill is {}",
                    maker.order_id, maker_order.remaining_quantity, fill
                );
                return Err(invariant_violation(market, what));
            }
            book.check_fill(&maker, fill)
                .map_err(|err| invariant_violation(market, err))?;

            // Ledger validates before writing; the book fill was confirmed above
            let trade = executor.execute_trade(market.id, &maker, order, fill, timestamp);
            ledger
                .apply_trade(&trade, trade.buyer(), trade.seller())
                .map_err(|err| invariant_violation(market, err))?;
            book.remove_or_decrement(&maker, fill)
                .map_err(|err| invariant_violation(market, err))?;
            maker_order.add_fill(fill, timestamp);
            order.add_fill(fill, timestamp);
            market.apply_trade_price(trade.side, trade.price, timestamp);

            debug!(
                market_id = %market.id,
                maker_order_id = %trade.maker_order_id,
                taker_order_id = %trade.taker_order_id,
                side = ?trade.side,
                price = %trade.price,
                quantity = %trade.quantity,
                "trade executed"
            );
            trade_log.push(trade.clone());
            trades.push(trade);
        }

        Ok(trades)
    }
}

fn invariant_violation(market: &Market, what: impl fmt::Display) -> EngineError {
    error!(market_id = %market.id, "invariant violated: {}", what);
    EngineError::InvariantViolation(what.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::errors::ErrorKind;
    use types::ids::MarketId;
    use types::market::Outcome;
    use types::order::OrderStatus;

    use crate::matching::SelfTradePolicy;

    const TS: i64 = 1708123456789000000;

    fn engine_at(yes: u64) -> MarketEngine {
        engine_with(yes, EngineConfig::default())
    }

    fn engine_with(yes: u64, config: EngineConfig) -> MarketEngine {
        let market = Market::new(
            MarketId::new(),
            "will-x-happen".to_string(),
            "Will X happen?".to_string(),
            None,
            Price::from_u64(yes),
            TS,
        );
        MarketEngine::new(market, config)
    }

    fn req(account: AccountId, side: Side, order_type: OrderType, price: u64, qty: u64) -> OrderRequest {
        OrderRequest::new(side, order_type, Price::from_u64(price), Quantity::new(qty)).for_account(account)
    }

    #[test]
    fn test_buy_into_empty_book_rests() {
        let mut engine = engine_at(60);
        let result = engine
            .submit(OrderRequest::new(Side::YES, OrderType::BUY, Price::from_u64(60), Quantity::new(10)), TS)
            .unwrap();

        assert!(result.trades.is_empty());
        assert_eq!(result.order.status, OrderStatus::Resting);
        assert_eq!(result.average_fill_price(), None);
        let book = engine.order_book();
        assert_eq!(book.len(), 1);
        assert_eq!(book[0].price, Price::from_u64(60));
        assert_eq!(book[0].remaining_quantity, Quantity::new(10));
        assert_eq!(book[0].order_type, OrderType::BUY);
        assert_eq!(engine.order(&result.order.order_id).unwrap().status, OrderStatus::Resting);
    }

    #[test]
    fn test_sell_without_inventory_is_rejected() {
        let mut engine = engine_at(60);
        let err = engine
            .submit(OrderRequest::new(Side::YES, OrderType::SELL, Price::from_u64(55), Quantity::new(10)), TS)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InsufficientInventory);
        assert!(engine.order_book().is_empty());
        assert!(engine.trades().is_empty());
    }

    #[test]
    fn test_sell_against_resting_buy_realizes_pnl() {
        let mut engine = engine_at(50);
        let seller = AccountId::new();
        let buyer = AccountId::new();
        engine.issue_complete_set(seller, Quantity::new(10), TS).unwrap();
        engine.submit(req(buyer, Side::YES, OrderType::BUY, 60, 10), TS).unwrap();

        let result = engine.submit(req(seller, Side::YES, OrderType::SELL, 60, 10), TS + 1).unwrap();

        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].price, Price::from_u64(60));
        assert_eq!(result.trades[0].quantity, Quantity::new(10));
        assert_eq!(result.order.status, OrderStatus::Filled);

        let yes = engine.ledger().entry(&seller, Side::YES).unwrap();
        assert_eq!(yes.realized_pnl, Decimal::from(100));
        assert!(yes.is_flat());
        assert_eq!(engine.market().yes_price, Price::from_u64(60));
        assert_eq!(engine.market().no_price, Price::from_u64(40));
        assert!(engine.order_book().is_empty());
    }

    #[test]
    fn test_execution_at_maker_price() {
        let mut engine = engine_at(50);
        let maker = AccountId::new();
        engine.issue_complete_set(maker, Quantity::new(5), TS).unwrap();
        engine.submit(req(maker, Side::YES, OrderType::SELL, 55, 5), TS).unwrap();

        let result = engine.submit(req(AccountId::new(), Side::YES, OrderType::BUY, 60, 5), TS + 1).unwrap();

        assert_eq!(result.trades[0].price, Price::from_u64(55));
        assert_eq!(result.average_fill_price(), Some(Decimal::from(55)));
        assert_eq!(engine.market().yes_price, Price::from_u64(55));
        assert_eq!(engine.market().no_price, Price::from_u64(45));
    }

    #[test]
    fn test_refused_fill_leaves_engine_untouched() {
        let mut engine = engine_at(50);
        let seller = AccountId::new();
        let buyer = AccountId::new();
        engine.issue_complete_set(seller, Quantity::new(10), TS).unwrap();
        let resting = engine.submit(req(seller, Side::YES, OrderType::SELL, 55, 10), TS).unwrap();

        // History and book disagree about the maker's remaining quantity
        engine
            .orders
            .get_mut(&resting.order.order_id)
            .unwrap()
            .add_fill(Quantity::new(8), TS);

        let err = engine.submit(req(buyer, Side::YES, OrderType::BUY, 60, 5), TS + 1).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        assert!(engine.trades().is_empty());
        assert_eq!(engine.ledger().quantity(&seller, Side::YES), Quantity::new(10));
        assert!(engine.ledger().entry(&buyer, Side::YES).is_none());
        let best = engine.book(Side::YES).best_sell().unwrap();
        assert_eq!(best.order_id, resting.order.order_id);
        assert_eq!(best.remaining_quantity, Quantity::new(10));
        assert_eq!(engine.market().yes_price, Price::from_u64(50));
        assert_eq!(engine.market().no_price, Price::from_u64(50));
    }

    #[test]
    fn test_price_time_priority_and_partial_maker() {
        let mut engine = engine_at(50);
        let first = AccountId::new();
        let second = AccountId::new();
        engine.issue_complete_set(first, Quantity::new(10), TS).unwrap();
        engine.issue_complete_set(second, Quantity::new(10), TS).unwrap();
        let early = engine.submit(req(first, Side::NO, OrderType::SELL, 52, 10), TS).unwrap();
        let late = engine.submit(req(second, Side::NO, OrderType::SELL, 52, 10), TS + 1).unwrap();

        let result = engine.submit(req(AccountId::new(), Side::NO, OrderType::BUY, 52, 4), TS + 2).unwrap();

        assert_eq!(result.trades.len(), 1);
        assert_eq!(result.trades[0].maker_order_id, early.order.order_id);
        let maker = engine.order(&early.order.order_id).unwrap();
        assert_eq!(maker.status, OrderStatus::PartiallyFilled);
        assert_eq!(maker.remaining_quantity, Quantity::new(6));

        // Partially filled maker keeps its place at the front
        let best = engine.book(Side::NO).best_sell().unwrap();
        assert_eq!(best.order_id, early.order.order_id);
        assert_eq!(best.remaining_quantity, Quantity::new(6));
        assert_eq!(engine.order(&late.order.order_id).unwrap().status, OrderStatus::Resting);
        // Trade on NO moves YES to the complement
        assert_eq!(engine.market().yes_price, Price::from_u64(48));
    }

    #[test]
    fn test_sweep_multiple_levels_then_rest() {
        let mut engine = engine_at(50);
        let maker = AccountId::new();
        engine.issue_complete_set(maker, Quantity::new(10), TS).unwrap();
        engine.submit(req(maker, Side::YES, OrderType::SELL, 57, 3), TS).unwrap();
        engine.submit(req(maker, Side::YES, OrderType::SELL, 55, 2), TS).unwrap();
        engine.submit(req(maker, Side::YES, OrderType::SELL, 70, 5), TS).unwrap();

        let taker = AccountId::new();
        let result = engine.submit(req(taker, Side::YES, OrderType::BUY, 60, 8), TS + 1).unwrap();

        let prices: Vec<Price> = result.trades.iter().map(|t| t.price).collect();
        assert_eq!(prices, vec![Price::from_u64(55), Price::from_u64(57)]);
        assert_eq!(result.order.status, OrderStatus::PartiallyFilled);
        assert_eq!(result.order.filled_quantity, Quantity::new(5));
        assert_eq!(result.order.remaining_quantity, Quantity::new(3));
        // (2*55 + 3*57) / 5
        assert_eq!(result.average_fill_price(), Some(Decimal::new(5620, 2)));
        assert_eq!(engine.book(Side::YES).best_buy().unwrap().order_id, result.order.order_id);
        assert!(!engine.book(Side::YES).is_crossed());
        assert_eq!(engine.market().yes_price, Price::from_u64(57));
        assert_eq!(engine.ledger().quantity(&taker, Side::YES), Quantity::new(5));
    }

    #[test]
    fn test_orders_never_cross_contracts() {
        let mut engine = engine_at(50);
        engine.submit(req(AccountId::new(), Side::YES, OrderType::BUY, 60, 5), TS).unwrap();
        let result = engine.submit(req(AccountId::new(), Side::NO, OrderType::BUY, 60, 5), TS).unwrap();

        assert!(result.trades.is_empty());
        assert_eq!(engine.order_book().len(), 2);
        assert_eq!(engine.order_book()[0].side, Side::YES);
    }

    #[test]
    fn test_invalid_prices_and_quantities() {
        let mut engine = engine_with(50, EngineConfig::default().with_max_order_quantity(100));
        let account = AccountId::new();

        for (price, qty) in [(0, 1), (100, 1), (50, 0), (50, 101)] {
            let err = engine.submit(req(account, Side::YES, OrderType::BUY, price, qty), TS).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
        let fractional = OrderRequest::new(Side::YES, OrderType::BUY, Price::from_str("0.5").unwrap(), Quantity::new(1));
        assert_eq!(engine.submit(fractional, TS).unwrap_err().kind(), ErrorKind::InvalidArgument);
        assert!(engine.order_book().is_empty());
    }

    #[test]
    fn test_resting_sells_reserve_inventory() {
        let mut engine = engine_at(50);
        let account = AccountId::new();
        engine.issue_complete_set(account, Quantity::new(10), TS).unwrap();
        engine.submit(req(account, Side::YES, OrderType::SELL, 70, 6), TS).unwrap();

        assert_eq!(engine.available_inventory(&account, Side::YES), Quantity::new(4));
        let err = engine.submit(req(account, Side::YES, OrderType::SELL, 75, 5), TS).unwrap_err();
        assert_eq!(err, EngineError::InsufficientInventory { required: 5, available: 4 });
        assert!(engine.submit(req(account, Side::YES, OrderType::SELL, 75, 4), TS).is_ok());
    }

    #[test]
    fn test_self_trade_allowed_by_default() {
        let mut engine = engine_at(50);
        let account = AccountId::new();
        engine.issue_complete_set(account, Quantity::new(5), TS).unwrap();
        engine.submit(req(account, Side::YES, OrderType::BUY, 55, 5), TS).unwrap();

        let result = engine.submit(req(account, Side::YES, OrderType::SELL, 55, 5), TS + 1).unwrap();

        assert_eq!(result.trades.len(), 1);
        assert!(result.trades[0].is_self_trade());
        assert_eq!(engine.ledger().quantity(&account, Side::YES), Quantity::new(5));
    }

    #[test]
    fn test_self_trade_rejected_by_policy() {
        let config = EngineConfig::default().with_self_trade_policy(SelfTradePolicy::Reject);
        let mut engine = engine_with(50, config);
        let account = AccountId::new();
        engine.issue_complete_set(account, Quantity::new(5), TS).unwrap();
        engine.submit(req(account, Side::YES, OrderType::BUY, 55, 5), TS).unwrap();

        let err = engine.submit(req(account, Side::YES, OrderType::SELL, 55, 5), TS + 1).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(engine.trades().is_empty());
        assert_eq!(engine.order_book().len(), 1);
    }

    #[test]
    fn test_round_trip_restores_quantity() {
        let mut engine = engine_at(50);
        let dealer = AccountId::new();
        let trader = AccountId::new();
        engine.issue_complete_set(dealer, Quantity::new(20), TS).unwrap();
        engine.issue_complete_set(trader, Quantity::new(3), TS).unwrap();
        let before = engine.ledger().quantity(&trader, Side::YES);

        engine.submit(req(dealer, Side::YES, OrderType::SELL, 40, 5), TS).unwrap();
        engine.submit(req(trader, Side::YES, OrderType::BUY, 40, 5), TS + 1).unwrap();
        engine.submit(req(dealer, Side::YES, OrderType::BUY, 45, 5), TS + 2).unwrap();
        engine.submit(req(trader, Side::YES, OrderType::SELL, 45, 5), TS + 3).unwrap();

        let entry = engine.ledger().entry(&trader, Side::YES).unwrap();
        assert_eq!(entry.quantity, before);
        // Bought 5 at 40 on top of 3 at 50 (avg 43.75), sold 5 at 45
        assert_eq!(entry.realized_pnl, Decimal::new(625, 2));
    }

    #[test]
    fn test_closed_market_refuses_orders_and_issuance() {
        let mut engine = engine_at(50);
        engine.market.freeze(Outcome::YES, TS);

        let err = engine.submit(req(AccountId::new(), Side::YES, OrderType::BUY, 50, 1), TS).unwrap_err();
        assert_eq!(err, EngineError::MarketClosed);
        let err = engine.issue_complete_set(AccountId::new(), Quantity::new(1), TS).unwrap_err();
        assert_eq!(err, EngineError::MarketClosed);
    }

    #[test]
    fn test_complete_set_books_current_prices() {
        let mut engine = engine_at(62);
        let account = AccountId::new();
        let positions = engine.issue_complete_set(account, Quantity::new(4), TS).unwrap();

        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].side, Side::YES);
        assert_eq!(positions[0].average_price, Decimal::from(62));
        assert_eq!(positions[1].side, Side::NO);
        assert_eq!(positions[1].average_price, Decimal::from(38));
        assert_eq!(engine.positions(&account), positions);
    }
}
