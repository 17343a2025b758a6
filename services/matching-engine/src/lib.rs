//! Matching Engine Service
//!
//! Price-time priority matching, position accounting and settlement for
//! binary (YES/NO) prediction markets.
//!
//! **Key Invariants:**
//! - `yes_price + no_price == 100` for every market at every instant
//! - Neither contract book is ever crossed after a submission returns
//! - Position quantities never go negative
//! - Deterministic matching (same inputs → same trades and book)
//!
//! Each market is one [`MarketEngine`]; the [`MarketRegistry`] serializes
//! access per market and lets different markets run in parallel.

pub mod book;
pub mod config;
pub mod engine;
pub mod ledger;
pub mod matching;
pub mod registry;
pub mod settlement;

pub use config::EngineConfig;
pub use engine::{MarketEngine, OrderRequest, SubmitResult};
pub use matching::SelfTradePolicy;
pub use registry::{MarketRegistry, NewMarket};
pub use settlement::{SettlementEngine, SettlementReport};
