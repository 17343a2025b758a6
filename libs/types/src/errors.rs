//! Error types for the market engine
//!
//! Comprehensive error taxonomy using thiserror. Callers match on
//! [`ErrorKind`] rather than on rendered messages.

use thiserror::Error;

/// Top-level engine error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Malformed input: price/quantity out of range, empty question, bad slug
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Market is resolved.")]
    MarketClosed,

    #[error("Cannot sell more contracts than currently held: required {required}, available {available}")]
    InsufficientInventory { required: u64, available: u64 },

    #[error("{0}")]
    Conflict(String),

    /// Internal bookkeeping broke an invariant. Never caused by user input.
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

/// Flat error tag, stable across message wording changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    MarketClosed,
    InsufficientInventory,
    Conflict,
    InvariantViolation,
}

impl EngineError {
    pub fn invalid(message: impl Into<String>) -> Self {
        EngineError::InvalidArgument(message.into())
    }

    pub fn market_not_found(id: impl ToString) -> Self {
        EngineError::NotFound {
            entity: "Market",
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            EngineError::NotFound { .. } => ErrorKind::NotFound,
            EngineError::MarketClosed => ErrorKind::MarketClosed,
            EngineError::InsufficientInventory { .. } => ErrorKind::InsufficientInventory,
            EngineError::Conflict(_) => ErrorKind::Conflict,
            EngineError::InvariantViolation(_) => ErrorKind::InvariantViolation,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
