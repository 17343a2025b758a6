//! Concurrency tests
//!
//! Markets run in parallel on one shared registry, and many threads hitting
//! the same market are serialized without breaking its invariants.

use std::sync::Arc;
use std::thread;

use matching_engine::{MarketRegistry, NewMarket, OrderRequest};
use types::errors::ErrorKind;
use types::ids::AccountId;
use types::market::Outcome;
use types::numeric::{Price, Quantity};
use types::order::{OrderType, Side};

#[test]
fn test_parallel_markets() {
    let registry = Arc::new(MarketRegistry::default());
    let questions = ["Rain in Paris?", "Rain in Oslo?", "Rain in Lima?", "Rain in Pune?"];

    let handles: Vec<_> = questions
        .into_iter()
        .map(|question| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let market = registry
                    .create_market(NewMarket::new(question, Price::from_u64(50)))
                    .unwrap();
                let seller = AccountId::new();
                let buyer = AccountId::new();
                registry
                    .issue_complete_set(&market.id, seller, Quantity::new(500))
                    .unwrap();

                let mut trades = 0;
                for _ in 0..500 {
                    registry
                        .submit_order(
                            &market.id,
                            OrderRequest::new(Side::YES, OrderType::SELL, Price::from_u64(55), Quantity::new(1))
                                .for_account(seller),
                        )
                        .unwrap();
                    let result = registry
                        .submit_order(
                            &market.id,
                            OrderRequest::new(Side::YES, OrderType::BUY, Price::from_u64(55), Quantity::new(1))
                                .for_account(buyer),
                        )
                        .unwrap();
                    trades += result.trades.len();
                }

                assert!(registry.order_book(&market.id).unwrap().is_empty());
                let positions = registry.positions(&market.id, &buyer).unwrap();
                assert_eq!(positions[0].quantity, Quantity::new(500));
                trades
            })
        })
        .collect();

    let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, 2000);
    assert_eq!(registry.len(), 4);
}

#[test]
fn test_contended_market_stays_consistent() {
    let registry = Arc::new(MarketRegistry::default());
    let market = registry
        .create_market(NewMarket::new("Contended?", Price::from_u64(50)))
        .unwrap();
    let sellers: Vec<AccountId> = (0..4).map(|_| AccountId::new()).collect();
    for seller in &sellers {
        registry
            .issue_complete_set(&market.id, *seller, Quantity::new(200))
            .unwrap();
    }

    let mut handles = Vec::new();
    for (i, seller) in sellers.iter().copied().enumerate() {
        let registry = Arc::clone(&registry);
        let market_id = market.id;
        handles.push(thread::spawn(move || {
            for n in 0..200u64 {
                let price = 45 + (n + i as u64) % 10;
                registry
                    .submit_order(
                        &market_id,
                        OrderRequest::new(Side::YES, OrderType::SELL, Price::from_u64(price), Quantity::new(1))
                            .for_account(seller),
                    )
                    .unwrap();
            }
        }));
    }
    for i in 0..4u64 {
        let registry = Arc::clone(&registry);
        let market_id = market.id;
        handles.push(thread::spawn(move || {
            let buyer = AccountId::new();
            for n in 0..200u64 {
                let price = 50 + (n + i) % 10;
                registry
                    .submit_order(
                        &market_id,
                        OrderRequest::new(Side::YES, OrderType::BUY, Price::from_u64(price), Quantity::new(1))
                            .for_account(buyer),
                    )
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    registry
        .with_market(&market.id, |engine| {
            assert!(engine.market().check_invariant());
            assert!(!engine.book(Side::YES).is_crossed());
            // No contract is created or destroyed by trading
            let held: u64 = engine
                .ledger()
                .all_positions()
                .filter(|p| p.side == Side::YES)
                .map(|p| p.quantity.value())
                .sum();
            assert_eq!(held, 800);
            Ok(())
        })
        .unwrap();

    registry.resolve(&market.id, Outcome::NO).unwrap();
    let err = registry.resolve(&market.id, Outcome::NO).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(registry.order_book(&market.id).unwrap().is_empty());
}
