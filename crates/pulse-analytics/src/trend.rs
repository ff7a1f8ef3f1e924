//! Higher-timeframe bias from an SMA pair.
//!
//! Reference implementation of the trend collaborator: fast SMA above
//! slow SMA is bullish, below is bearish, and confidence grows with the
//! relative gap between the two. Callers with a better trend source
//! simply provide their own `TrendProvider`.

use pulse_core::{Candle, HtfTrend, TrendBias};
use rust_decimal::Decimal;

/// Relative SMA gap (in percent) at which confidence saturates at 1.
const FULL_CONFIDENCE_GAP_PCT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Gap below which the bias is reported neutral.
const NEUTRAL_BAND_PCT: Decimal = Decimal::from_parts(2, 0, 0, false, 1); // 0.2

fn sma(candles: &[Candle], period: usize) -> Option<Decimal> {
    if period == 0 || candles.len() < period {
        return None;
    }
    let sum: Decimal = candles[candles.len() - period..]
        .iter()
        .map(|c| c.close.inner())
        .sum();
    Some(sum / Decimal::from(period as u64))
}

/// Compute the higher-timeframe bias from a candle series.
///
/// Returns None when there are not enough candles for the slow SMA.
pub fn htf_bias(candles: &[Candle], fast: usize, slow: usize) -> Option<HtfTrend> {
    if fast == 0 || slow <= fast {
        return None;
    }
    let fast_sma = sma(candles, fast)?;
    let slow_sma = sma(candles, slow)?;
    if slow_sma.is_zero() {
        return None;
    }

    let gap_pct = (fast_sma - slow_sma) / slow_sma * Decimal::ONE_HUNDRED;
    let bias = if gap_pct.abs() < NEUTRAL_BAND_PCT {
        TrendBias::Neutral
    } else if gap_pct > Decimal::ZERO {
        TrendBias::Bullish
    } else {
        TrendBias::Bearish
    };
    let confidence = (gap_pct.abs() / FULL_CONFIDENCE_GAP_PCT).min(Decimal::ONE);

    Some(HtfTrend::new(bias, confidence))
}
