//! Precision-safe price type.
//!
//! Uses `rust_decimal` for exact decimal arithmetic, avoiding
//! floating-point rounding errors critical in financial calculations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

/// Price with exact decimal precision.
///
/// Wraps `Decimal` to provide type safety and keep percent/offset math
/// in one place instead of scattered across both engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);
    pub const ONE: Self = Self(Decimal::ONE);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Percent change from `other` to `self`.
    ///
    /// Returns None if `other` is zero.
    #[inline]
    pub fn pct_change_from(&self, other: Price) -> Option<Decimal> {
        if other.is_zero() {
            return None;
        }
        Some((self.0 - other.0) / other.0 * Decimal::ONE_HUNDRED)
    }

    /// Price offset by a signed percentage of itself.
    ///
    /// `offset_pct(dec!(1))` is 1% above, `offset_pct(dec!(-1))` 1% below.
    #[inline]
    pub fn offset_pct(&self, pct: Decimal) -> Price {
        Self(self.0 * (Decimal::ONE + pct / Decimal::ONE_HUNDRED))
    }

    /// Whether `self` lies within `pct` percent of `other` (absolute distance).
    #[inline]
    pub fn within_pct_of(&self, other: Price, pct: Decimal) -> bool {
        if other.is_zero() {
            return false;
        }
        ((self.0 - other.0) / other.0 * Decimal::ONE_HUNDRED).abs() <= pct
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<Decimal> for Price {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<Decimal> for Price {
    type Output = Self;

    fn div(self, rhs: Decimal) -> Self::Output {
        Self(self.0 / rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pct_change() {
        let p1 = Price::new(dec!(100));
        let p2 = Price::new(dec!(107));

        assert_eq!(p2.pct_change_from(p1).unwrap(), dec!(7));
        assert_eq!(p1.pct_change_from(p2).unwrap().round_dp(4), dec!(-6.5421));
        assert!(p1.pct_change_from(Price::ZERO).is_none());
    }

    #[test]
    fn test_offset_pct() {
        let p = Price::new(dec!(200));

        assert_eq!(p.offset_pct(dec!(1)), Price::new(dec!(202)));
        assert_eq!(p.offset_pct(dec!(-0.5)), Price::new(dec!(199)));
    }

    #[test]
    fn test_within_pct_of() {
        let target = Price::new(dec!(100));

        assert!(Price::new(dec!(100.9)).within_pct_of(target, dec!(1)));
        assert!(Price::new(dec!(99.1)).within_pct_of(target, dec!(1)));
        assert!(!Price::new(dec!(101.5)).within_pct_of(target, dec!(1)));
        assert!(!Price::new(dec!(1)).within_pct_of(Price::ZERO, dec!(1)));
    }
}
