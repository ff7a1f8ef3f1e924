//! Execution-cost collaborator contract.
//!
//! The engine never estimates friction itself: entry and exit fills go
//! through a `CostModel`, which returns the adjusted fill price and fees.

use pulse_core::{Direction, Price};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Coarse volatility regime used to scale slippage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityBucket {
    Calm,
    #[default]
    Normal,
    Elevated,
    Extreme,
}

impl VolatilityBucket {
    /// Slippage multiplier for the bucket.
    #[must_use]
    pub fn slippage_factor(&self) -> Decimal {
        match self {
            Self::Calm => Decimal::new(5, 1),  // 0.5
            Self::Normal => Decimal::ONE,      // 1.0
            Self::Elevated => Decimal::TWO,    // 2.0
            Self::Extreme => Decimal::from(4), // 4.0
        }
    }
}

/// Adjusted fill returned by the cost model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeCosts {
    /// Fill price after slippage.
    pub effective_price: Price,
    /// Fees charged on the notional.
    pub fees: Decimal,
}

/// Execution-cost model.
///
/// `direction` is the direction of the order being filled: entering a
/// long and exiting a short are both `Long` (buys). Implementations are
/// pure; the engine calls them for entry and exit fills.
pub trait CostModel {
    fn costs(
        &self,
        price: Price,
        notional: Decimal,
        direction: Direction,
        bucket: VolatilityBucket,
    ) -> TradeCosts;
}

/// Percent-fee cost model: taker fee plus volatility-scaled slippage,
/// both in basis points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PercentFeeModel {
    pub taker_fee_bps: Decimal,
    pub slippage_bps: Decimal,
}

impl PercentFeeModel {
    #[must_use]
    pub fn new(taker_fee_bps: Decimal, slippage_bps: Decimal) -> Self {
        Self {
            taker_fee_bps,
            slippage_bps,
        }
    }

    /// A model with no friction at all. Useful for analysis runs where
    /// costs are accounted elsewhere.
    #[must_use]
    pub fn free() -> Self {
        Self::new(Decimal::ZERO, Decimal::ZERO)
    }
}

impl CostModel for PercentFeeModel {
    fn costs(
        &self,
        price: Price,
        notional: Decimal,
        direction: Direction,
        bucket: VolatilityBucket,
    ) -> TradeCosts {
        let bps = Decimal::from(10_000);
        let slip = self.slippage_bps * bucket.slippage_factor() / bps;
        // Buys fill above the quote, sells below.
        let effective_price = price.offset_pct(direction.signed(slip) * Decimal::ONE_HUNDRED);
        let fees = notional * self.taker_fee_bps / bps;

        TradeCosts {
            effective_price,
            fees,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_free_model_is_identity() {
        let model = PercentFeeModel::free();
        let costs = model.costs(
            Price::new(dec!(100)),
            dec!(1000),
            Direction::Long,
            VolatilityBucket::Normal,
        );

        assert_eq!(costs.effective_price, Price::new(dec!(100)));
        assert_eq!(costs.fees, Decimal::ZERO);
    }

    #[test]
    fn test_slippage_is_adverse() {
        let model = PercentFeeModel::new(dec!(4), dec!(10));

        // A buy fills 10 bps above the quote.
        let buy = model.costs(
            Price::new(dec!(100)),
            dec!(1000),
            Direction::Long,
            VolatilityBucket::Normal,
        );
        assert_eq!(buy.effective_price, Price::new(dec!(100.1)));

        // A sell fills below.
        let sell = model.costs(
            Price::new(dec!(100)),
            dec!(1000),
            Direction::Short,
            VolatilityBucket::Normal,
        );
        assert_eq!(sell.effective_price, Price::new(dec!(99.9)));

        // Fees are 4 bps of notional.
        assert_eq!(buy.fees, dec!(0.4));
    }

    #[test]
    fn test_bucket_scales_slippage() {
        let model = PercentFeeModel::new(dec!(0), dec!(10));

        let extreme = model.costs(
            Price::new(dec!(100)),
            dec!(1000),
            Direction::Long,
            VolatilityBucket::Extreme,
        );
        // 40 bps at 4x.
        assert_eq!(extreme.effective_price, Price::new(dec!(100.4)));
    }
}
