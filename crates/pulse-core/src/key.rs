//! Arena-map keys for engine-owned entities.
//!
//! A `Setup` is owned by the detection engine keyed by
//! (symbol, timeframe, direction); a `Position` is owned by exactly one
//! lifecycle engine instance keyed by a `PositionKey`. Keys are immutable
//! and there is no ambient global state, so multiple independent engine
//! instances can coexist.

use crate::{Direction, Timeframe};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Market segment a position trades on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    Futures,
    Spot,
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Futures => write!(f, "futures"),
            Self::Spot => write!(f, "spot"),
        }
    }
}

/// Identity of a tracked setup: one per (symbol, timeframe, direction).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SetupKey {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub direction: Direction,
}

impl SetupKey {
    #[must_use]
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe, direction: Direction) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            direction,
        }
    }
}

impl fmt::Display for SetupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.symbol, self.timeframe, self.direction)
    }
}

/// Identity of a position slot, chosen by the owning bot.
///
/// Multi-position bots scope the slot by symbol/timeframe/direction/market;
/// single-position bots use the one `Single` slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum PositionKey {
    Scoped {
        symbol: String,
        timeframe: Timeframe,
        direction: Direction,
        market: Market,
    },
    Single,
}

impl PositionKey {
    #[must_use]
    pub fn scoped(
        symbol: impl Into<String>,
        timeframe: Timeframe,
        direction: Direction,
        market: Market,
    ) -> Self {
        Self::Scoped {
            symbol: symbol.into(),
            timeframe,
            direction,
            market,
        }
    }

    #[must_use]
    pub fn single() -> Self {
        Self::Single
    }

    /// Key for the position opened from a given setup.
    #[must_use]
    pub fn from_setup(setup: &SetupKey, market: Market) -> Self {
        Self::scoped(
            setup.symbol.clone(),
            setup.timeframe,
            setup.direction,
            market,
        )
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scoped {
                symbol,
                timeframe,
                direction,
                market,
            } => write!(f, "{symbol}-{timeframe}-{direction}-{market}"),
            Self::Single => write!(f, "single"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_key_display() {
        let key = SetupKey::new("BTCUSDT", Timeframe::M15, Direction::Long);
        assert_eq!(key.to_string(), "BTCUSDT-15m-long");
    }

    #[test]
    fn test_position_key_from_setup() {
        let setup = SetupKey::new("ETHUSDT", Timeframe::H1, Direction::Short);
        let key = PositionKey::from_setup(&setup, Market::Futures);
        assert_eq!(key.to_string(), "ETHUSDT-1h-short-futures");
    }

    #[test]
    fn test_keys_are_distinct_per_direction() {
        let long = SetupKey::new("BTCUSDT", Timeframe::M15, Direction::Long);
        let short = SetupKey::new("BTCUSDT", Timeframe::M15, Direction::Short);
        assert_ne!(long, short);
    }

    #[test]
    fn test_position_key_serde_roundtrip() {
        let scoped = PositionKey::scoped("BTCUSDT", Timeframe::H4, Direction::Long, Market::Spot);
        let json = serde_json::to_string(&scoped).unwrap();
        assert_eq!(serde_json::from_str::<PositionKey>(&json).unwrap(), scoped);

        let single: PositionKey = serde_json::from_str(r#"{"kind":"single"}"#).unwrap();
        assert_eq!(single, PositionKey::Single);
    }
}
