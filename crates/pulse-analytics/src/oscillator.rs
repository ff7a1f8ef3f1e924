//! Bounded momentum oscillator (Wilder-smoothed RSI).
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss), with Wilder smoothing of
//! the averages. The first defined value sits at candle index `period`;
//! everything before that is warm-up.
//!
//! The warm-up offset is carried explicitly by `OscillatorSeries` and all
//! candle-index lookups go through `value_at`, so callers never have to
//! reconstruct the candle/oscillator alignment themselves.

use pulse_core::{Candle, Direction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Short-term movement of the oscillator over its last readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OscTrend {
    Rising,
    Falling,
    Flat,
}

/// An oscillator series aligned to a candle slice.
///
/// `values[i]` is the reading for candle index `offset + i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OscillatorSeries {
    period: usize,
    offset: usize,
    values: Vec<Decimal>,
}

impl OscillatorSeries {
    /// Compute the oscillator over candle closes.
    ///
    /// Returns None when `period` is zero or there are not enough candles
    /// for a single reading (`period + 1` closes).
    pub fn compute(candles: &[Candle], period: usize) -> Option<Self> {
        if period == 0 || candles.len() < period + 1 {
            return None;
        }

        let mut gains = Decimal::ZERO;
        let mut losses = Decimal::ZERO;
        for w in candles[..=period].windows(2) {
            let change = w[1].close.inner() - w[0].close.inner();
            if change > Decimal::ZERO {
                gains += change;
            } else {
                losses -= change;
            }
        }

        let period_dec = Decimal::from(period as u64);
        let mut avg_gain = gains / period_dec;
        let mut avg_loss = losses / period_dec;

        let mut values = Vec::with_capacity(candles.len() - period);
        values.push(rsi_value(avg_gain, avg_loss));

        // Wilder smoothing for subsequent readings.
        for w in candles[period..].windows(2) {
            let change = w[1].close.inner() - w[0].close.inner();
            let gain = change.max(Decimal::ZERO);
            let loss = (-change).max(Decimal::ZERO);

            avg_gain = (avg_gain * (period_dec - Decimal::ONE) + gain) / period_dec;
            avg_loss = (avg_loss * (period_dec - Decimal::ONE) + loss) / period_dec;

            values.push(rsi_value(avg_gain, avg_loss));
        }

        Some(Self {
            period,
            offset: period,
            values,
        })
    }

    #[must_use]
    pub fn period(&self) -> usize {
        self.period
    }

    /// Candle index of the first defined reading.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Reading for a candle index, None during warm-up or out of range.
    #[must_use]
    pub fn value_at(&self, candle_idx: usize) -> Option<Decimal> {
        candle_idx
            .checked_sub(self.offset)
            .and_then(|i| self.values.get(i))
            .copied()
    }

    /// Reading at the most recent candle.
    #[must_use]
    pub fn latest(&self) -> Option<Decimal> {
        self.values.last().copied()
    }

    /// Reading at the candle before the most recent one.
    #[must_use]
    pub fn previous(&self) -> Option<Decimal> {
        let n = self.values.len();
        if n < 2 {
            return None;
        }
        self.values.get(n - 2).copied()
    }

    /// Classify the short-term movement from the last two readings.
    ///
    /// Moves smaller than 0.5 points count as flat.
    #[must_use]
    pub fn short_term_trend(&self) -> OscTrend {
        let flat_band = Decimal::new(5, 1);
        match (self.previous(), self.latest()) {
            (Some(prev), Some(curr)) if curr - prev > flat_band => OscTrend::Rising,
            (Some(prev), Some(curr)) if prev - curr > flat_band => OscTrend::Falling,
            _ => OscTrend::Flat,
        }
    }
}

fn rsi_value(avg_gain: Decimal, avg_loss: Decimal) -> Decimal {
    if avg_loss.is_zero() && avg_gain.is_zero() {
        // No movement at all.
        Decimal::from(50)
    } else if avg_loss.is_zero() {
        Decimal::ONE_HUNDRED
    } else if avg_gain.is_zero() {
        Decimal::ZERO
    } else {
        Decimal::ONE_HUNDRED - Decimal::ONE_HUNDRED / (Decimal::ONE + avg_gain / avg_loss)
    }
}

/// Threshold cross in the direction's qualifying sense.
///
/// True when the previous reading was inside the neutral zone and the
/// current one is beyond the extreme level. Recorded for telemetry; the
/// binding entry condition is the first-extreme rule, not the cross.
pub fn crossed_into_extreme(
    prev: Decimal,
    current: Decimal,
    direction: Direction,
    long_level: Decimal,
    short_level: Decimal,
) -> bool {
    !direction.osc_beyond(prev, long_level, short_level)
        && direction.osc_beyond(current, long_level, short_level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pulse_core::Price;
    use rust_decimal_macros::dec;

    fn bars(closes: &[Decimal]) -> Vec<Candle> {
        closes
            .iter()
            .map(|&c| {
                Candle::new(
                    Utc::now(),
                    Price::new(c),
                    Price::new(c),
                    Price::new(c),
                    Price::new(c),
                    dec!(100),
                )
            })
            .collect()
    }

    #[test]
    fn test_all_gains_pegs_at_100() {
        let candles = bars(&[
            dec!(100),
            dec!(101),
            dec!(102),
            dec!(103),
            dec!(104),
            dec!(105),
        ]);
        let series = OscillatorSeries::compute(&candles, 3).unwrap();
        assert_eq!(series.value_at(3).unwrap(), dec!(100));
    }

    #[test]
    fn test_all_losses_pegs_at_0() {
        let candles = bars(&[
            dec!(105),
            dec!(104),
            dec!(103),
            dec!(102),
            dec!(101),
            dec!(100),
        ]);
        let series = OscillatorSeries::compute(&candles, 3).unwrap();
        assert_eq!(series.value_at(3).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_mixed_stays_in_bounds() {
        let candles = bars(&[
            dec!(100),
            dec!(105),
            dec!(98),
            dec!(110),
            dec!(95),
            dec!(115),
            dec!(90),
        ]);
        let series = OscillatorSeries::compute(&candles, 3).unwrap();
        for idx in 3..candles.len() {
            let v = series.value_at(idx).unwrap();
            assert!(v >= Decimal::ZERO && v <= dec!(100), "out of bounds: {v}");
        }
    }

    #[test]
    fn test_warmup_alignment() {
        let candles = bars(&[
            dec!(100),
            dec!(101),
            dec!(102),
            dec!(103),
            dec!(104),
            dec!(105),
        ]);
        let series = OscillatorSeries::compute(&candles, 3).unwrap();

        // Indices 0..period are warm-up.
        assert!(series.value_at(0).is_none());
        assert!(series.value_at(2).is_none());
        assert!(series.value_at(3).is_some());
        assert_eq!(series.offset(), 3);
        // Latest lines up with the last candle.
        assert_eq!(series.latest(), series.value_at(candles.len() - 1));
    }

    #[test]
    fn test_too_few_candles() {
        let candles = bars(&[dec!(100), dec!(101), dec!(102)]);
        assert!(OscillatorSeries::compute(&candles, 3).is_none());
        assert!(OscillatorSeries::compute(&candles, 0).is_none());
    }

    #[test]
    fn test_cross_detection() {
        // Long: crossing down through 30.
        assert!(crossed_into_extreme(
            dec!(34),
            dec!(28),
            Direction::Long,
            dec!(30),
            dec!(70)
        ));
        // Already beyond: no cross.
        assert!(!crossed_into_extreme(
            dec!(29),
            dec!(28),
            Direction::Long,
            dec!(30),
            dec!(70)
        ));
        // Short: crossing up through 70.
        assert!(crossed_into_extreme(
            dec!(66),
            dec!(72),
            Direction::Short,
            dec!(30),
            dec!(70)
        ));
    }
}
