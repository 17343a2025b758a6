//! Matching logic module
//!
//! Price-time priority helpers: crossing rules, the self-trade policy point,
//! and trade generation.

pub mod crossing;
pub mod executor;

pub use crossing::{crosses, SelfTradePolicy};
pub use executor::MatchExecutor;
