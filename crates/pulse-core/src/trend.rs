//! Higher-timeframe trend signal.

use crate::Direction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Directional bias of the higher timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendBias {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for TrendBias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bullish => write!(f, "bullish"),
            Self::Bearish => write!(f, "bearish"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

/// Higher-timeframe trend with a confidence score in 0..1.
///
/// Provided by an external collaborator; `None` at the call site means no
/// signal is available and confirmation stays unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtfTrend {
    pub bias: TrendBias,
    pub confidence: Decimal,
}

impl HtfTrend {
    #[must_use]
    pub fn new(bias: TrendBias, confidence: Decimal) -> Self {
        Self { bias, confidence }
    }

    /// Whether the bias agrees with a trade direction.
    ///
    /// Neutral aligns with neither.
    #[must_use]
    pub fn aligns_with(&self, direction: Direction) -> bool {
        matches!(
            (self.bias, direction),
            (TrendBias::Bullish, Direction::Long) | (TrendBias::Bearish, Direction::Short)
        )
    }

    /// Whether confidence meets the gating threshold.
    #[must_use]
    pub fn is_confident(&self, threshold: Decimal) -> bool {
        self.confidence >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_alignment() {
        let bull = HtfTrend::new(TrendBias::Bullish, dec!(0.8));
        assert!(bull.aligns_with(Direction::Long));
        assert!(!bull.aligns_with(Direction::Short));

        let neutral = HtfTrend::new(TrendBias::Neutral, dec!(0.9));
        assert!(!neutral.aligns_with(Direction::Long));
        assert!(!neutral.aligns_with(Direction::Short));
    }

    #[test]
    fn test_confidence_gate() {
        let t = HtfTrend::new(TrendBias::Bearish, dec!(0.55));
        assert!(t.is_confident(dec!(0.5)));
        assert!(!t.is_confident(dec!(0.6)));
    }
}
