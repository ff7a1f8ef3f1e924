//! Impulse move detection.
//!
//! An impulse is a swing-to-swing directional move whose percent size and
//! dominance (fraction of candles inside the move closing with it) both
//! clear configurable minimums. Detection scans a bounded lookback window
//! and returns the strongest qualifying move.

use crate::swing::{swing_points, SwingKind};
use pulse_core::{Candle, Direction, Price};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Swing confirmation strength used for impulse endpoints.
const ENDPOINT_STRENGTH: usize = 2;

/// A detected impulse move.
///
/// Indices are absolute positions in the candle slice handed to
/// `detect_impulse`. The impulse reference attached to a setup is never
/// replaced for the setup's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Impulse {
    pub direction: Direction,
    pub start_idx: usize,
    pub end_idx: usize,
    pub start_price: Price,
    pub end_price: Price,
    /// Absolute percent size of the move.
    pub percent_move: Decimal,
    /// Fraction of candles inside the move that closed with it, 0..1.
    pub dominance: Decimal,
}

impl Impulse {
    /// Price distance between the endpoints.
    #[must_use]
    pub fn range(&self) -> Decimal {
        (self.end_price.inner() - self.start_price.inner()).abs()
    }

    /// Whether a price sits strictly between the impulse endpoints.
    #[must_use]
    pub fn contains(&self, price: Price) -> bool {
        let lo = self.start_price.min(self.end_price);
        let hi = self.start_price.max(self.end_price);
        price > lo && price < hi
    }

    /// Fraction of the impulse range retraced from the end back toward the
    /// start. 0 at the end price, 1 at the start price, above 1 past it.
    #[must_use]
    pub fn retracement_fraction(&self, price: Price) -> Option<Decimal> {
        let range = self.range();
        if range.is_zero() {
            return None;
        }
        let retraced = match self.direction {
            Direction::Long => self.end_price.inner() - price.inner(),
            Direction::Short => price.inner() - self.end_price.inner(),
        };
        Some(retraced / range)
    }

    /// Whether price has moved beyond the impulse's starting point,
    /// breaking the structure the setup is built on.
    #[must_use]
    pub fn broken_by(&self, price: Price) -> bool {
        self.direction.breaches(price, self.start_price)
    }
}

/// Scan a bounded lookback window for the strongest qualifying impulse.
///
/// Endpoints must be confirmed swing points. Both directions are
/// considered; the largest percent move that clears `min_percent` and
/// `min_dominance` wins. Returns None when nothing qualifies.
pub fn detect_impulse(
    candles: &[Candle],
    min_percent: Decimal,
    min_dominance: Decimal,
    lookback: usize,
) -> Option<Impulse> {
    if candles.is_empty() || lookback < 2 * ENDPOINT_STRENGTH + 1 {
        return None;
    }

    let base = candles.len().saturating_sub(lookback);
    let window = &candles[base..];
    let swings = swing_points(window, ENDPOINT_STRENGTH);

    let mut best: Option<Impulse> = None;
    for (i, from) in swings.iter().enumerate() {
        for to in &swings[i + 1..] {
            let (direction, low, high) = match (from.kind, to.kind) {
                (SwingKind::Low, SwingKind::High) => (Direction::Long, from.price, to.price),
                (SwingKind::High, SwingKind::Low) => (Direction::Short, to.price, from.price),
                _ => continue,
            };
            if low.is_zero() || high <= low {
                continue;
            }

            let percent = match direction {
                Direction::Long => high.pct_change_from(low),
                Direction::Short => low.pct_change_from(high).map(|p| p.abs()),
            };
            let Some(percent) = percent else { continue };
            if percent < min_percent {
                continue;
            }

            let span = &window[from.idx..=to.idx];
            let with_move = span.iter().filter(|c| c.moves_with(direction)).count();
            let dominance = Decimal::from(with_move as u64) / Decimal::from(span.len() as u64);
            if dominance < min_dominance {
                continue;
            }

            if best.map_or(true, |b| percent > b.percent_move) {
                best = Some(Impulse {
                    direction,
                    start_idx: base + from.idx,
                    end_idx: base + to.idx,
                    start_price: from.price,
                    end_price: to.price,
                    percent_move: percent,
                    dominance,
                });
            }
        }
    }

    if let Some(ref imp) = best {
        trace!(
            direction = %imp.direction,
            percent = %imp.percent_move,
            dominance = %imp.dominance,
            "impulse detected"
        );
    }
    best
}

/// Whether the counter-move is running on contracting volume.
///
/// Compares average volume after the impulse end against average volume
/// inside the impulse. Returns None when either side has no candles.
pub fn volume_contraction(candles: &[Candle], impulse: &Impulse) -> Option<bool> {
    let inside = candles.get(impulse.start_idx..=impulse.end_idx)?;
    let after = candles.get(impulse.end_idx + 1..)?;
    if inside.is_empty() || after.is_empty() {
        return None;
    }

    let avg = |cs: &[Candle]| {
        cs.iter().map(|c| c.volume).sum::<Decimal>() / Decimal::from(cs.len() as u64)
    };
    Some(avg(after) < avg(inside))
}
