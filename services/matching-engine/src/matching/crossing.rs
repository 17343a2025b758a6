//! Crossing detection logic
//!
//! Determines when an incoming order meets a resting order, and holds the
//! single policy point for orders that would trade against their own account.

use types::errors::{EngineError, EngineResult};
use types::ids::AccountId;
use types::numeric::{Price, Quantity};
use types::order::OrderType;

use crate::book::OrderBook;

/// Check if an incoming order crosses a resting order of the opposite type
///
/// A BUY crosses a SELL priced at or below it; a SELL crosses a BUY priced at
/// or above it.
pub fn crosses(incoming_type: OrderType, incoming_price: Price, resting_price: Price) -> bool {
    match incoming_type {
        OrderType::BUY => incoming_price >= resting_price,
        OrderType::SELL => incoming_price <= resting_price,
    }
}

/// What to do when an order would match a resting order of the same account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelfTradePolicy {
    /// Trade normally
    #[default]
    Allow,
    /// Refuse the incoming order before anything changes
    Reject,
}

impl std::str::FromStr for SelfTradePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(SelfTradePolicy::Allow),
            "reject" => Ok(SelfTradePolicy::Reject),
            other => Err(format!("unknown self-trade policy '{}'", other)),
        }
    }
}

impl SelfTradePolicy {
    /// Vet an incoming order against the resting orders it would consume
    ///
    /// Walks the opposite book in priority order for as much quantity as the
    /// incoming order would take, without mutating anything.
    pub fn check(
        &self,
        book: &OrderBook,
        account_id: &AccountId,
        order_type: OrderType,
        price: Price,
        quantity: Quantity,
    ) -> EngineResult<()> {
        if *self == SelfTradePolicy::Allow {
            return Ok(());
        }

        let mut remaining = quantity;
        for resting in book.resting_orders() {
            if remaining.is_zero() {
                break;
            }
            if resting.order_type != order_type.opposite() {
                continue;
            }
            if !crosses(order_type, price, resting.price) {
                break;
            }
            if &resting.account_id == account_id {
                return Err(EngineError::invalid(
                    "Order would trade against a resting order of the same account.",
                ));
            }
            remaining = remaining.saturating_sub(resting.remaining_quantity);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::MarketId;
    use types::order::{Order, Side};

    #[test]
    fn test_incoming_buy_crosses() {
        assert!(crosses(OrderType::BUY, Price::from_u64(60), Price::from_u64(55)));
        assert!(crosses(OrderType::BUY, Price::from_u64(60), Price::from_u64(60)));
        assert!(!crosses(OrderType::BUY, Price::from_u64(54), Price::from_u64(55)));
    }

    #[test]
    fn test_incoming_sell_crosses() {
        assert!(crosses(OrderType::SELL, Price::from_u64(55), Price::from_u64(60)));
        assert!(crosses(OrderType::SELL, Price::from_u64(60), Price::from_u64(60)));
        assert!(!crosses(OrderType::SELL, Price::from_u64(61), Price::from_u64(60)));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("allow".parse::<SelfTradePolicy>(), Ok(SelfTradePolicy::Allow));
        assert_eq!(" Reject ".parse::<SelfTradePolicy>(), Ok(SelfTradePolicy::Reject));
        assert!("sometimes".parse::<SelfTradePolicy>().is_err());
    }

    fn book_with(account: AccountId, other: AccountId) -> OrderBook {
        let market = MarketId::new();
        let mut book = OrderBook::new(Side::YES);
        // other's BUY at 60 has priority, account's BUY at 58 is behind it
        book.insert_resting(&Order::new(market, other, Side::YES, OrderType::BUY, Price::from_u64(60), Quantity::new(5), 1, 0));
        book.insert_resting(&Order::new(market, account, Side::YES, OrderType::BUY, Price::from_u64(58), Quantity::new(5), 2, 0));
        book
    }

    #[test]
    fn test_reject_only_when_own_order_would_be_reached() {
        let account = AccountId::new();
        let book = book_with(account, AccountId::new());
        let policy = SelfTradePolicy::Reject;

        // Consumes only the other account's order
        assert!(policy.check(&book, &account, OrderType::SELL, Price::from_u64(55), Quantity::new(5)).is_ok());
        // Does not cross the own order at 58
        assert!(policy.check(&book, &account, OrderType::SELL, Price::from_u64(59), Quantity::new(10)).is_ok());
        // Reaches the own order
        let err = policy
            .check(&book, &account, OrderType::SELL, Price::from_u64(55), Quantity::new(6))
            .unwrap_err();
        assert_eq!(err.kind(), types::errors::ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_allow_never_rejects() {
        let account = AccountId::new();
        let book = book_with(account, account);
        assert!(SelfTradePolicy::Allow
            .check(&book, &account, OrderType::SELL, Price::from_u64(1), Quantity::new(10))
            .is_ok());
    }
}
