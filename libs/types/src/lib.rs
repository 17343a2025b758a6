//! Types library for the binary prediction market
//!
//! This library provides the core type definitions shared by the matching
//! engine and the gateway, ensuring type safety and deterministic arithmetic.
//!
//! # Modules
//! - `ids`: Unique identifiers (OrderId, TradeId, AccountId, MarketId)
//! - `numeric`: Fixed-point price and whole-contract quantity
//! - `market`: Market lifecycle types
//! - `order`: Order lifecycle types
//! - `trade`: Trade execution types
//! - `position`: Position ledger entries
//! - `errors`: Error taxonomy

// Public modules
pub mod ids;
pub mod numeric;
pub mod market;
pub mod order;
pub mod trade;
pub mod position;
pub mod errors;
