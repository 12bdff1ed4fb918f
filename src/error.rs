//! Error types for the strategy layer.
//!
//! Missing market data is never an error here; it is an absent value and the
//! strategies skip the cycle. These errors cover configuration mistakes and
//! invariant violations reported by collaborators.

use thiserror::Error;

use crate::execution::PositionId;
use crate::Symbol;

/// Invalid or unknown configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Unknown strategy: '{name}'. Available: {available}")]
    UnknownStrategy { name: String, available: String },

    #[error("Unknown timeframe: '{0}'")]
    UnknownTimeframe(String),

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Failed to parse {strategy} parameters: {reason}")]
    Parse { strategy: &'static str, reason: String },
}

/// Position manager invariant violations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PositionError {
    #[error("Credit supply position {0} is not open")]
    CreditPositionNotOpen(PositionId),

    #[error("Position {0} is not a credit supply position")]
    NotCreditSupply(PositionId),
}

/// Indicator declaration and evaluation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Indicator '{0}' is declared twice")]
    Duplicate(String),

    #[error("Pair '{0}' appears more than once in the universe")]
    DuplicatePair(Symbol),

    #[error("Indicator '{indicator}' depends on '{dependency}', which has not been computed yet")]
    UnresolvedDependency {
        indicator: String,
        dependency: String,
    },

    #[error("Column '{column}' length {actual} does not match candle count {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}
