//! Error types for pulse-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid timeframe: {0}")]
    InvalidTimeframe(String),

    #[error("Invalid candle data: {0}")]
    InvalidCandle(String),

    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Decimal parse error: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
