//! Structured logging and session statistics for the pulse bot.

pub mod error;
pub mod logging;
pub mod stats;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use stats::SessionStats;
