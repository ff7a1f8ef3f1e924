//! Swing-point helpers.
//!
//! A swing high is a candle whose high exceeds the highs of `strength`
//! candles on each side; swing lows mirror with lows. Used for impulse
//! endpoint discovery and divergence anchoring.

use pulse_core::{Candle, Direction, Price};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwingKind {
    High,
    Low,
}

/// A confirmed local extreme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwingPoint {
    pub idx: usize,
    pub price: Price,
    pub kind: SwingKind,
}

/// Find all confirmed swing points in a candle slice.
///
/// `strength` candles on each side must be strictly less extreme.
/// Candles too close to either edge cannot confirm and are skipped.
pub fn swing_points(candles: &[Candle], strength: usize) -> Vec<SwingPoint> {
    let mut points = Vec::new();
    if strength == 0 || candles.len() < 2 * strength + 1 {
        return points;
    }

    for idx in strength..candles.len() - strength {
        let window = &candles[idx - strength..=idx + strength];
        let candidate = candles[idx];

        let is_high = window
            .iter()
            .enumerate()
            .all(|(i, c)| i == strength || c.high < candidate.high);
        if is_high {
            points.push(SwingPoint {
                idx,
                price: candidate.high,
                kind: SwingKind::High,
            });
        }

        let is_low = window
            .iter()
            .enumerate()
            .all(|(i, c)| i == strength || c.low > candidate.low);
        if is_low {
            points.push(SwingPoint {
                idx,
                price: candidate.low,
                kind: SwingKind::Low,
            });
        }
    }

    points
}

/// Extreme of the counter-move since a given candle index.
///
/// For a long setup this is the pullback low since the impulse ended; for
/// a short, the bounce high. Returns None when `since_idx` is out of range.
pub fn pullback_extreme(candles: &[Candle], since_idx: usize, direction: Direction) -> Option<Price> {
    let tail = candles.get(since_idx..)?;
    match direction {
        Direction::Long => tail.iter().map(|c| c.low).min(),
        Direction::Short => tail.iter().map(|c| c.high).max(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn candle(low: Decimal, high: Decimal) -> Candle {
        Candle::new(
            Utc::now(),
            Price::new(low),
            Price::new(high),
            Price::new(low),
            Price::new(high),
            dec!(100),
        )
    }

    #[test]
    fn test_swing_high_and_low() {
        let candles = vec![
            candle(dec!(10), dec!(11)),
            candle(dec!(9), dec!(10)),  // swing low at idx 1
            candle(dec!(10), dec!(12)), // swing high at idx 2
            candle(dec!(9.5), dec!(11)),
            candle(dec!(10), dec!(11.5)),
        ];

        let points = swing_points(&candles, 1);
        assert!(points
            .iter()
            .any(|p| p.idx == 1 && p.kind == SwingKind::Low && p.price == Price::new(dec!(9))));
        assert!(points
            .iter()
            .any(|p| p.idx == 2 && p.kind == SwingKind::High && p.price == Price::new(dec!(12))));
    }

    #[test]
    fn test_edges_cannot_confirm() {
        let candles = vec![
            candle(dec!(8), dec!(9)), // lowest, but at the edge
            candle(dec!(10), dec!(11)),
            candle(dec!(9), dec!(12)),
        ];
        let points = swing_points(&candles, 1);
        assert!(!points.iter().any(|p| p.idx == 0));
    }

    #[test]
    fn test_pullback_extreme() {
        let candles = vec![
            candle(dec!(10), dec!(11)),
            candle(dec!(12), dec!(14)),
            candle(dec!(11), dec!(13)), // pullback begins
            candle(dec!(10.5), dec!(12)),
        ];

        assert_eq!(
            pullback_extreme(&candles, 2, Direction::Long),
            Some(Price::new(dec!(10.5)))
        );
        assert_eq!(
            pullback_extreme(&candles, 2, Direction::Short),
            Some(Price::new(dec!(13)))
        );
        assert!(pullback_extreme(&candles, 9, Direction::Long).is_none());
    }
}
