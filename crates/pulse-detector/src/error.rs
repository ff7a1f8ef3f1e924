//! Detector error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid state transition: {0}")]
    InvalidTransition(String),
}

pub type DetectorResult<T> = Result<T, DetectorError>;
