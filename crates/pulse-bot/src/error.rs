//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Core error: {0}")]
    Core(#[from] pulse_core::CoreError),

    #[error("Detector error: {0}")]
    Detector(#[from] pulse_detector::DetectorError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] pulse_position::LifecycleError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] pulse_telemetry::TelemetryError),

    #[error("Candle data error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
