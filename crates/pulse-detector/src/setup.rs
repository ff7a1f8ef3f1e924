//! The `Setup` entity and its state machine.

use chrono::{DateTime, Utc};
use pulse_analytics::{Divergence, OscTrend};
use pulse_core::{Direction, Price, SetupKey};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a setup.
///
/// `Watching` describes a freshly evaluated, non-actionable candidate; such
/// candidates are never persisted, so tracked setups start at `Triggered`
/// or `DeepExtreme`. `PlayedOut` is reachable from any active state on
/// invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupState {
    Watching,
    Triggered,
    DeepExtreme,
    Reversing,
    PlayedOut,
}

impl SetupState {
    /// States from which this state may be entered.
    #[must_use]
    pub fn can_transition(&self, to: SetupState) -> bool {
        use SetupState::*;
        matches!(
            (self, to),
            (Watching, Triggered)
                | (Watching, DeepExtreme)
                | (Watching, PlayedOut)
                | (Triggered, DeepExtreme)
                | (Triggered, Reversing)
                | (Triggered, PlayedOut)
                | (DeepExtreme, Triggered)
                | (DeepExtreme, Reversing)
                | (DeepExtreme, PlayedOut)
                | (Reversing, PlayedOut)
        )
    }

    /// Whether a position may be opened from this state.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        matches!(self, Self::Triggered | Self::DeepExtreme)
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::PlayedOut)
    }
}

impl fmt::Display for SetupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Watching => "watching",
            Self::Triggered => "triggered",
            Self::DeepExtreme => "deep_extreme",
            Self::Reversing => "reversing",
            Self::PlayedOut => "played_out",
        };
        write!(f, "{label}")
    }
}

/// Position-building tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    /// Entry extreme reached; single entry.
    One,
    /// Deep extreme reached; adding to size is permitted.
    Two,
}

impl Tier {
    #[must_use]
    pub fn allows_adds(&self) -> bool {
        matches!(self, Self::Two)
    }
}

/// Pattern classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// The normal pattern: impulse plus first extreme.
    FirstExtreme,
    /// Retraced too deep; recorded but lower confidence.
    MomentumExhaustion,
}

/// Higher-timeframe alignment at detection time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HtfAlignment {
    Confirmed,
    Unconfirmed,
    /// No higher-timeframe signal was available.
    Unknown,
}

/// The impulse a setup is anchored to.
///
/// Exactly one impulse reference is associated with a setup for its entire
/// lifetime; it is never replaced. When the structure dies, the setup is
/// retired and a new one created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpulseRef {
    pub direction: Direction,
    pub start_price: Price,
    pub end_price: Price,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub percent_move: Decimal,
    pub dominance: Decimal,
}

impl ImpulseRef {
    /// Price distance between the endpoints.
    #[must_use]
    pub fn range(&self) -> Decimal {
        (self.end_price.inner() - self.start_price.inner()).abs()
    }

    /// Whether a price sits strictly between the endpoints.
    #[must_use]
    pub fn contains(&self, price: Price) -> bool {
        let lo = self.start_price.min(self.end_price);
        let hi = self.start_price.max(self.end_price);
        price > lo && price < hi
    }

    /// Fraction of the range retraced from the end toward the start.
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

    /// Whether price has broken through the impulse's starting point.
    #[must_use]
    pub fn broken_by(&self, price: Price) -> bool {
        self.direction.breaches(price, self.start_price)
    }
}

/// Classify a setup against its impulse at the current price.
///
/// Retracing more than the threshold fraction of the impulse range (or
/// moving beyond its start) marks the pattern as momentum exhaustion.
pub fn classify(impulse: &ImpulseRef, price: Price, retrace_threshold: Decimal) -> Classification {
    if impulse.broken_by(price) {
        return Classification::MomentumExhaustion;
    }
    match impulse.retracement_fraction(price) {
        Some(f) if f > retrace_threshold => Classification::MomentumExhaustion,
        _ => Classification::FirstExtreme,
    }
}

/// A tracked setup: one per (symbol, timeframe, direction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setup {
    pub key: SetupKey,
    pub state: SetupState,
    pub impulse: ImpulseRef,

    // Oscillator tracking.
    pub osc_value: Decimal,
    pub osc_at_trigger: Decimal,
    pub osc_previous: Option<Decimal>,
    pub osc_trend: OscTrend,
    /// Whether the entry reading arrived as a threshold cross.
    pub crossed_on_trigger: bool,

    // Structural levels.
    pub pullback_extreme: Price,
    pub protective_price: Price,

    // Confirmation flags.
    pub htf_alignment: HtfAlignment,
    pub volume_contraction: Option<bool>,
    pub divergence: Option<Divergence>,
    pub classification: Classification,

    // Position building.
    pub tier: Tier,
    pub adds_allowed: bool,

    // Live fields.
    pub last_price: Price,
    pub detected_at: DateTime<Utc>,
    pub triggered_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

impl Setup {
    /// Whether a caller should act on this setup.
    ///
    /// Momentum-exhaustion setups are tracked but advisory only.
    #[must_use]
    pub fn is_tradable(&self) -> bool {
        self.state.is_actionable() && self.classification == Classification::FirstExtreme
    }

    pub(crate) fn direction(&self) -> Direction {
        self.key.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn long_impulse() -> ImpulseRef {
        ImpulseRef {
            direction: Direction::Long,
            start_price: Price::new(dec!(100)),
            end_price: Price::new(dec!(110)),
            start_time: Utc::now(),
            end_time: Utc::now(),
            percent_move: dec!(10),
            dominance: dec!(0.7),
        }
    }

    #[test]
    fn test_transition_table() {
        use SetupState::*;

        assert!(Triggered.can_transition(DeepExtreme));
        assert!(DeepExtreme.can_transition(Triggered));
        assert!(Triggered.can_transition(Reversing));
        assert!(Reversing.can_transition(PlayedOut));

        // Invalidation is reachable from every active state.
        for from in [Watching, Triggered, DeepExtreme, Reversing] {
            assert!(from.can_transition(PlayedOut));
        }

        // No resurrection, no skipping back.
        assert!(!PlayedOut.can_transition(Triggered));
        assert!(!Reversing.can_transition(Triggered));
        assert!(!Reversing.can_transition(DeepExtreme));
        assert!(!Triggered.can_transition(Watching));
    }

    #[test]
    fn test_classify_by_retracement() {
        let imp = long_impulse();

        // Shallow pullback keeps the pattern.
        assert_eq!(
            classify(&imp, Price::new(dec!(106)), dec!(0.618)),
            Classification::FirstExtreme
        );
        // 70% retrace is exhaustion.
        assert_eq!(
            classify(&imp, Price::new(dec!(103)), dec!(0.618)),
            Classification::MomentumExhaustion
        );
        // Beyond the start is exhaustion too.
        assert_eq!(
            classify(&imp, Price::new(dec!(99)), dec!(0.618)),
            Classification::MomentumExhaustion
        );
    }

    #[test]
    fn test_impulse_ref_short_side() {
        let imp = ImpulseRef {
            direction: Direction::Short,
            start_price: Price::new(dec!(110)),
            end_price: Price::new(dec!(100)),
            start_time: Utc::now(),
            end_time: Utc::now(),
            percent_move: dec!(9.09),
            dominance: dec!(0.6),
        };

        assert!(imp.contains(Price::new(dec!(105))));
        assert!(!imp.contains(Price::new(dec!(110))));
        // Bounce halfway back up.
        assert_eq!(
            imp.retracement_fraction(Price::new(dec!(105))).unwrap(),
            dec!(0.5)
        );
        // Structure break is back above the start.
        assert!(imp.broken_by(Price::new(dec!(110.5))));
        assert!(!imp.broken_by(Price::new(dec!(109))));
    }
}
