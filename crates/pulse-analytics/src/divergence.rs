//! Price/oscillator divergence detection.
//!
//! Bullish divergence: price prints a lower swing low while the oscillator
//! prints a higher low. Bearish divergence mirrors with swing highs. Only
//! the divergence consistent with the requested direction is reported.

use crate::oscillator::OscillatorSeries;
use crate::swing::{swing_points, SwingKind};
use pulse_core::{Candle, Direction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DivergenceKind {
    Bullish,
    Bearish,
}

/// A detected divergence annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Divergence {
    pub kind: DivergenceKind,
    /// Oscillator-gap strength, 0..1.
    pub strength: Decimal,
}

/// Oscillator points per unit of strength; a 25-point gap saturates at 1.
const STRENGTH_SCALE: Decimal = Decimal::from_parts(25, 0, 0, false, 0);

/// Detect a divergence supporting the given direction.
///
/// Looks at the last two confirmed swing extremes on the relevant side
/// that have defined oscillator readings. Returns None when there are
/// fewer than two such anchors or no disagreement.
pub fn detect_divergence(
    candles: &[Candle],
    oscillator: &OscillatorSeries,
    direction: Direction,
) -> Option<Divergence> {
    let wanted = match direction {
        Direction::Long => SwingKind::Low,
        Direction::Short => SwingKind::High,
    };

    let anchors: Vec<_> = swing_points(candles, 2)
        .into_iter()
        .filter(|p| p.kind == wanted)
        .filter_map(|p| oscillator.value_at(p.idx).map(|osc| (p, osc)))
        .collect();
    if anchors.len() < 2 {
        return None;
    }

    let (earlier, osc_earlier) = anchors[anchors.len() - 2];
    let (later, osc_later) = anchors[anchors.len() - 1];

    let diverges = match direction {
        // Lower low in price, higher low in the oscillator.
        Direction::Long => later.price < earlier.price && osc_later > osc_earlier,
        // Higher high in price, lower high in the oscillator.
        Direction::Short => later.price > earlier.price && osc_later < osc_earlier,
    };
    if !diverges {
        return None;
    }

    let gap = (osc_later - osc_earlier).abs();
    let strength = (gap / STRENGTH_SCALE).min(Decimal::ONE);
    let kind = match direction {
        Direction::Long => DivergenceKind::Bullish,
        Direction::Short => DivergenceKind::Bearish,
    };

    Some(Divergence { kind, strength })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pulse_core::Price;
    use rust_decimal_macros::dec;

    fn candles_from_closes(closes: &[Decimal]) -> Vec<Candle> {
        closes
            .iter()
            .map(|&c| {
                Candle::new(
                    Utc::now(),
                    Price::new(c),
                    Price::new(c + dec!(0.1)),
                    Price::new(c - dec!(0.1)),
                    Price::new(c),
                    dec!(100),
                )
            })
            .collect()
    }

    #[test]
    fn test_bullish_divergence() {
        // Two price lows, the second lower; a falling-then-steadying tape
        // leaves the oscillator higher at the second low.
        let closes = [
            dec!(110),
            dec!(104),
            dec!(98), // first low, after a sharp drop
            dec!(103),
            dec!(106),
            dec!(104),
            dec!(101),
            dec!(97), // second low, shallower approach
            dec!(100),
            dec!(102),
        ];
        let candles = candles_from_closes(&closes);
        let osc = OscillatorSeries::compute(&candles, 2).unwrap();

        let div = detect_divergence(&candles, &osc, Direction::Long).unwrap();
        assert_eq!(div.kind, DivergenceKind::Bullish);
        assert!(div.strength > Decimal::ZERO && div.strength <= Decimal::ONE);

        // Bearish side must not fire on this tape.
        assert!(detect_divergence(&candles, &osc, Direction::Short).is_none());
    }

    #[test]
    fn test_no_divergence_without_two_anchors() {
        let closes = [dec!(100), dec!(99), dec!(98), dec!(99), dec!(100)];
        let candles = candles_from_closes(&closes);
        let osc = OscillatorSeries::compute(&candles, 2).unwrap();

        assert!(detect_divergence(&candles, &osc, Direction::Long).is_none());
    }
}
