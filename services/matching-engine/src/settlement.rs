//! Market resolution
//!
//! Resolving is a single check-then-act transition on a [`MarketEngine`]:
//! cancel every resting order, pay out and flatten every position, then
//! freeze the market prices at 100/0.

use tracing::{error, info};
use types::errors::{EngineError, EngineResult};
use types::ids::OrderId;
use types::market::{Market, Outcome, Resolution};
use types::order::OrderStatus;

use crate::engine::MarketEngine;

/// What a resolution changed
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementReport {
    /// Market in its terminal state
    pub market: Market,
    pub resolution: Resolution,
    /// Orders taken off the books, in book order
    pub cancelled_orders: Vec<OrderId>,
}

pub struct SettlementEngine;

impl SettlementEngine {
    /// Resolve `engine`'s market to `outcome`
    ///
    /// Fails with `Conflict` on an already resolved market. Any internal
    /// inconsistency aborts before the market is touched.
    pub fn resolve(engine: &mut MarketEngine, outcome: Outcome, timestamp: i64) -> EngineResult<SettlementReport> {
        if !engine.market.is_open() {
            return Err(EngineError::Conflict("Market is already resolved.".to_string()));
        }
        let market_id = engine.market.id;

        // Every resting order must be a live order in the history
        for resting in engine.order_book() {
            let live = engine
                .orders
                .get(&resting.order_id)
                .is_some_and(|order| !order.status.is_terminal());
            if !live {
                error!(market_id = %market_id, order_id = %resting.order_id, "resting order missing from history");
                return Err(EngineError::InvariantViolation(format!(
                    "resting order {} is not a live order",
                    resting.order_id
                )));
            }
        }

        // Atomic on its own; nothing else has changed yet if it fails
        let payout = engine.ledger.settle(outcome, timestamp)?;

        let mut cancelled_orders = Vec::new();
        let drained: Vec<_> = engine
            .books_mut()
            .into_iter()
            .flat_map(|book| book.cancel_all())
            .collect();
        for resting in drained {
            if let Some(order) = engine.orders.get_mut(&resting.order_id) {
                order.cancel(timestamp);
                debug_assert_eq!(order.status, OrderStatus::Cancelled);
            }
            cancelled_orders.push(resting.order_id);
        }

        engine.market.freeze(outcome, timestamp);
        let resolution = Resolution {
            market_id,
            outcome,
            payout_yes: payout.yes,
            payout_no: payout.no,
            resolved_at: timestamp,
        };
        engine.resolution = Some(resolution.clone());

        info!(
            market_id = %market_id,
            outcome = ?outcome,
            cancelled = cancelled_orders.len(),
            payout_yes = %payout.yes,
            payout_no = %payout.no,
            "market resolved"
        );

        Ok(SettlementReport {
            market: engine.market.clone(),
            resolution,
            cancelled_orders,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use types::errors::ErrorKind;
    use types::ids::{AccountId, MarketId};
    use types::market::MarketStatus;
    use types::numeric::{Price, Quantity};
    use types::order::{OrderType, Side};

    use crate::config::EngineConfig;
    use crate::engine::OrderRequest;

    const TS: i64 = 1708123456789000000;

    fn engine_at(yes: u64) -> MarketEngine {
        let market = Market::new(
            MarketId::new(),
            "will-x-happen".to_string(),
            "Will X happen?".to_string(),
            None,
            Price::from_u64(yes),
            TS,
        );
        MarketEngine::new(market, EngineConfig::default())
    }

    fn req(account: AccountId, side: Side, order_type: OrderType, price: u64, qty: u64) -> OrderRequest {
        OrderRequest::new(side, order_type, Price::from_u64(price), Quantity::new(qty)).for_account(account)
    }

    #[test]
    fn test_resolve_pays_winner_and_cancels_book() {
        let mut engine = engine_at(40);
        let account = AccountId::new();
        // 5 YES at 40, 5 NO at 60
        engine.issue_complete_set(account, Quantity::new(5), TS).unwrap();
        let buy = engine.submit(req(AccountId::new(), Side::YES, OrderType::BUY, 30, 3), TS).unwrap();
        let sell = engine.submit(req(account, Side::NO, OrderType::SELL, 70, 2), TS).unwrap();

        let report = SettlementEngine::resolve(&mut engine, Outcome::YES, TS + 1).unwrap();

        let yes = engine.ledger().entry(&account, Side::YES).unwrap();
        assert_eq!(yes.realized_pnl, Decimal::from(300));
        assert!(yes.is_flat());
        let no = engine.ledger().entry(&account, Side::NO).unwrap();
        assert_eq!(no.realized_pnl, Decimal::from(-300));
        assert!(no.is_flat());

        assert_eq!(report.market.status, MarketStatus::RESOLVED);
        assert_eq!(report.market.outcome, Some(Outcome::YES));
        assert_eq!(report.market.yes_price, Price::HUNDRED);
        assert_eq!(report.market.no_price, Price::ZERO);
        assert_eq!(report.resolution.payout_yes, Decimal::from(500));
        assert_eq!(report.resolution.payout_no, Decimal::ZERO);
        assert_eq!(report.cancelled_orders, vec![buy.order.order_id, sell.order.order_id]);
        assert!(engine.order_book().is_empty());
        assert_eq!(engine.order(&buy.order.order_id).unwrap().status, OrderStatus::Cancelled);
        assert_eq!(engine.resolution(), Some(&report.resolution));
    }

    #[test]
    fn test_second_resolve_conflicts_without_changes() {
        let mut engine = engine_at(50);
        engine.issue_complete_set(AccountId::new(), Quantity::new(2), TS).unwrap();
        SettlementEngine::resolve(&mut engine, Outcome::NO, TS).unwrap();
        let market = engine.market().clone();
        let resolution = engine.resolution().cloned();

        let err = SettlementEngine::resolve(&mut engine, Outcome::YES, TS + 1).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(engine.market(), &market);
        assert_eq!(engine.resolution().cloned(), resolution);
    }

    #[test]
    fn test_complete_set_settles_flat() {
        let mut engine = engine_at(73);
        let account = AccountId::new();
        engine.issue_complete_set(account, Quantity::new(9), TS).unwrap();

        SettlementEngine::resolve(&mut engine, Outcome::NO, TS).unwrap();

        let total: Decimal = engine.positions(&account).iter().map(|p| p.realized_pnl).sum();
        assert_eq!(total, Decimal::ZERO);
    }

    #[test]
    fn test_partially_filled_resting_order_is_cancelled() {
        let mut engine = engine_at(50);
        let maker = AccountId::new();
        engine.issue_complete_set(maker, Quantity::new(10), TS).unwrap();
        let sell = engine.submit(req(maker, Side::YES, OrderType::SELL, 55, 10), TS).unwrap();
        engine.submit(req(AccountId::new(), Side::YES, OrderType::BUY, 55, 4), TS).unwrap();

        let report = SettlementEngine::resolve(&mut engine, Outcome::NO, TS + 1).unwrap();

        assert_eq!(report.cancelled_orders, vec![sell.order.order_id]);
        let order = engine.order(&sell.order.order_id).unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!(order.filled_quantity, Quantity::new(4));
        assert!(engine.ledger().all_positions().all(|p| p.quantity.is_zero()));
    }
}
