//! Collaborator contracts consumed by the engines.
//!
//! The engines never perform I/O themselves; candle series and trend
//! signals are injected through these traits by the orchestrator.

use crate::{Candle, HtfTrend, Result, Timeframe};

/// Source of ordered candle series.
///
/// Implementations must return candles ascending by time, at least the
/// most recent 50 when available. Fetch failures are surfaced as errors;
/// the orchestrator decides whether to retry.
pub trait CandleProvider {
    fn candles(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Candle>>;
}

/// Source of the higher-timeframe trend signal.
///
/// `None` means no signal is available for the symbol; the detection
/// engine then proceeds with confirmation marked unknown.
pub trait TrendProvider {
    fn higher_timeframe_trend(&self, symbol: &str, timeframe: Timeframe) -> Option<HtfTrend>;
}
