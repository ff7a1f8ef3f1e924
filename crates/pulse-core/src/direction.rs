//! Trade direction and direction-dependent comparators.
//!
//! Long and short handling is symmetric everywhere in the system. Instead of
//! duplicating every branch, both engines take a `Direction` tag and go
//! through the comparators below, so a price/oscillator rule is written once.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Profit from rising prices.
    Long,
    /// Profit from falling prices.
    Short,
}

impl Direction {
    pub const BOTH: [Direction; 2] = [Direction::Long, Direction::Short];

    /// The opposite direction.
    #[must_use]
    pub fn opposite(&self) -> Self {
        match self {
            Self::Long => Self::Short,
            Self::Short => Self::Long,
        }
    }

    /// +1 for long, -1 for short.
    #[inline]
    pub fn sign(&self) -> Decimal {
        match self {
            Self::Long => Decimal::ONE,
            Self::Short => Decimal::NEGATIVE_ONE,
        }
    }

    /// A value offset in this trade's favorable direction.
    ///
    /// For a long, favorable is up; for a short, down.
    #[inline]
    pub fn signed(&self, value: Decimal) -> Decimal {
        self.sign() * value
    }

    /// Whether price `a` is more favorable than `b` for this direction.
    ///
    /// Long: `a > b`. Short: `a < b`.
    #[inline]
    pub fn favors(&self, a: crate::Price, b: crate::Price) -> bool {
        match self {
            Self::Long => a > b,
            Self::Short => a < b,
        }
    }

    /// Whether `price` has crossed through `level` against the trade.
    ///
    /// This is the protective-level test: a long is breached when price is
    /// at or below the level, a short when at or above it.
    #[inline]
    pub fn breaches(&self, price: crate::Price, level: crate::Price) -> bool {
        match self {
            Self::Long => price <= level,
            Self::Short => price >= level,
        }
    }

    /// Whether an oscillator reading is beyond the extreme zone for this
    /// direction.
    ///
    /// Long setups form in oversold territory (reading at or below
    /// `long_level`), shorts in overbought (at or above `short_level`).
    #[inline]
    pub fn osc_beyond(&self, value: Decimal, long_level: Decimal, short_level: Decimal) -> bool {
        match self {
            Self::Long => value <= long_level,
            Self::Short => value >= short_level,
        }
    }

    /// Whether oscillator reading `a` is deeper into this direction's
    /// extreme zone than `b`.
    #[inline]
    pub fn osc_deeper(&self, a: Decimal, b: Decimal) -> bool {
        match self {
            Self::Long => a < b,
            Self::Short => a > b,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Price;
    use rust_decimal_macros::dec;

    #[test]
    fn test_favors_is_symmetric() {
        let a = Price::new(dec!(101));
        let b = Price::new(dec!(100));

        assert!(Direction::Long.favors(a, b));
        assert!(!Direction::Short.favors(a, b));
        assert!(Direction::Short.favors(b, a));
    }

    #[test]
    fn test_breaches() {
        let stop = Price::new(dec!(95));

        assert!(Direction::Long.breaches(Price::new(dec!(94)), stop));
        assert!(Direction::Long.breaches(Price::new(dec!(95)), stop));
        assert!(!Direction::Long.breaches(Price::new(dec!(96)), stop));

        assert!(Direction::Short.breaches(Price::new(dec!(96)), stop));
        assert!(!Direction::Short.breaches(Price::new(dec!(94)), stop));
    }

    #[test]
    fn test_osc_beyond() {
        // Long beyond at <= 30, short beyond at >= 70.
        assert!(Direction::Long.osc_beyond(dec!(28), dec!(30), dec!(70)));
        assert!(!Direction::Long.osc_beyond(dec!(31), dec!(30), dec!(70)));
        assert!(Direction::Short.osc_beyond(dec!(72), dec!(30), dec!(70)));
        assert!(!Direction::Short.osc_beyond(dec!(69), dec!(30), dec!(70)));
    }

    #[test]
    fn test_osc_deeper() {
        assert!(Direction::Long.osc_deeper(dec!(22), dec!(25)));
        assert!(Direction::Short.osc_deeper(dec!(78), dec!(75)));
        assert!(!Direction::Long.osc_deeper(dec!(26), dec!(25)));
    }

    #[test]
    fn test_signed() {
        assert_eq!(Direction::Long.signed(dec!(5)), dec!(5));
        assert_eq!(Direction::Short.signed(dec!(5)), dec!(-5));
    }
}
