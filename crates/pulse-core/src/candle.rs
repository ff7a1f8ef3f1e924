//! Market data primitives: candles and timeframes.

use crate::{Direction, Price};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single OHLCV candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    /// Candle open time.
    pub timestamp: DateTime<Utc>,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Decimal,
}

impl Candle {
    #[must_use]
    pub fn new(
        timestamp: DateTime<Utc>,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Decimal,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Close above open.
    #[inline]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Close below open.
    #[inline]
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Whether the candle closed in the given trade direction.
    ///
    /// Used for impulse dominance counting.
    #[inline]
    pub fn moves_with(&self, direction: Direction) -> bool {
        match direction {
            Direction::Long => self.is_bullish(),
            Direction::Short => self.is_bearish(),
        }
    }

    /// High-to-low range.
    #[inline]
    pub fn range(&self) -> Price {
        self.high - self.low
    }
}

/// Chart timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
}

impl Timeframe {
    /// Duration of one candle in minutes.
    #[must_use]
    pub fn minutes(&self) -> u32 {
        match self {
            Self::M1 => 1,
            Self::M5 => 5,
            Self::M15 => 15,
            Self::M30 => 30,
            Self::H1 => 60,
            Self::H4 => 240,
            Self::D1 => 1440,
        }
    }

    /// The conventional confirmation timeframe one level up.
    #[must_use]
    pub fn higher(&self) -> Timeframe {
        match self {
            Self::M1 => Self::M15,
            Self::M5 => Self::H1,
            Self::M15 => Self::H1,
            Self::M30 => Self::H4,
            Self::H1 => Self::H4,
            Self::H4 => Self::D1,
            Self::D1 => Self::D1,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::M1 => "1m",
            Self::M5 => "5m",
            Self::M15 => "15m",
            Self::M30 => "30m",
            Self::H1 => "1h",
            Self::H4 => "4h",
            Self::D1 => "1d",
        };
        write!(f, "{label}")
    }
}

impl FromStr for Timeframe {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(Self::M1),
            "5m" => Ok(Self::M5),
            "15m" => Ok(Self::M15),
            "30m" => Ok(Self::M30),
            "1h" => Ok(Self::H1),
            "4h" => Ok(Self::H4),
            "1d" => Ok(Self::D1),
            other => Err(crate::CoreError::InvalidTimeframe(other.to_string())),
        }
    }
}
