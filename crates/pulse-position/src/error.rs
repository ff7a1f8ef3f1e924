//! Lifecycle error types.
//!
//! Business-rule rejections are typed values with a readable reason and
//! cause zero state mutation; nothing here is a fatal error.

use crate::position::PositionStatus;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Position already exists for key: {0}")]
    DuplicatePosition(String),

    #[error("Maximum concurrent positions reached ({0})")]
    MaxPositionsReached(usize),

    #[error("Insufficient margin: required {required}, available {available}")]
    InsufficientMargin {
        required: Decimal,
        available: Decimal,
    },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        from: PositionStatus,
        to: PositionStatus,
    },

    #[error("Position not found: {0}")]
    NotFound(String),

    #[error("Position is not live: {0}")]
    NotLive(String),

    #[error("Invalid close fraction: {0}")]
    InvalidFraction(Decimal),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
