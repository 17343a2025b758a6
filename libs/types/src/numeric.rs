//! Fixed-point price and whole-contract quantity types
//!
//! Prices are cents of probability held as rust_decimal values, quantized to
//! two decimal places with half-up rounding. Quantities are whole contracts.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::ops::Add;

/// Number of decimal places kept on every price
pub const PRICE_SCALE: u32 = 2;

/// Quantize a decimal amount to cents (HALF_UP)
pub fn quantize_cents(amount: Decimal) -> Decimal {
    amount
        .round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

/// Price in cents of probability, range [0, 100]
///
/// Serialized as a JSON number. The inner value is always quantized and
/// normalized so equal prices share one representation inside book keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Price(#[serde(serialize_with = "rust_decimal::serde::float::serialize")] Decimal);

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        rust_decimal::serde::float::deserialize(deserializer).map(Price::from_decimal)
    }
}

impl Price {
    pub const ZERO: Price = Price(Decimal::ZERO);
    pub const HUNDRED: Price = Price(Decimal::ONE_HUNDRED);

    /// Build a price from any decimal, quantizing to cents
    pub fn from_decimal(value: Decimal) -> Self {
        Self(quantize_cents(value))
    }

    pub fn from_u64(value: u64) -> Self {
        Self(Decimal::from(value))
    }

    /// Parse a decimal string, e.g. "60.50"
    pub fn from_str(value: &str) -> Option<Self> {
        Decimal::from_str_exact(value).ok().map(Self::from_decimal)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Price of the complementary contract: `100 - self`
    pub fn complement(&self) -> Self {
        Self::from_decimal(Decimal::ONE_HUNDRED - self.0)
    }

    /// Limit orders must be strictly inside the probability range
    pub fn is_valid_order_price(&self) -> bool {
        self.0 >= Decimal::ONE && self.0 <= Decimal::from(99)
    }

    /// Initial market prices are accepted on the same range as orders
    pub fn is_valid_initial_price(&self) -> bool {
        self.is_valid_order_price()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whole number of contracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u64);

impl Quantity {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn as_decimal(&self) -> Decimal {
        Decimal::from(self.0)
    }

    /// Subtract, returning None instead of wrapping below zero
    pub fn checked_sub(self, rhs: Quantity) -> Option<Quantity> {
        self.0.checked_sub(rhs.0).map(Quantity)
    }

    pub fn saturating_sub(self, rhs: Quantity) -> Quantity {
        Quantity(self.0.saturating_sub(rhs.0))
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 + rhs.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
