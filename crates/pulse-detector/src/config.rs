//! Detection engine configuration.
//!
//! Oscillator thresholds are stated from the long (oversold) side; the
//! short side mirrors around 50 automatically.

use pulse_core::Direction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Configuration for setup detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Candles scanned when looking for an impulse.
    #[serde(default = "default_lookback")]
    pub lookback: usize,
    /// Minimum impulse size in percent.
    #[serde(default = "default_min_impulse_pct")]
    pub min_impulse_pct: Decimal,
    /// Minimum fraction of candles moving with the impulse, 0..1.
    #[serde(default = "default_min_dominance")]
    pub min_dominance: Decimal,
    /// Oscillator period.
    #[serde(default = "default_osc_period")]
    pub osc_period: usize,
    /// Entry extreme for longs (oversold); shorts mirror at 100 - value.
    #[serde(default = "default_entry_extreme")]
    pub entry_extreme: Decimal,
    /// Deep extreme enabling tier-2 position building; shorts mirror.
    #[serde(default = "default_deep_extreme")]
    pub deep_extreme: Decimal,
    /// Oscillator level that completes a reversal; shorts mirror.
    /// More lenient than the opposite extreme.
    #[serde(default = "default_recovery_level")]
    pub recovery_level: Decimal,
    /// Buffer below the pullback extreme for the protective price, percent.
    #[serde(default = "default_structure_buffer_pct")]
    pub structure_buffer_pct: Decimal,
    /// Minimum higher-timeframe confidence before alignment is enforced.
    #[serde(default = "default_htf_confidence")]
    pub htf_confidence: Decimal,
    /// Distance from the impulse end that counts as target reached, percent.
    #[serde(default = "default_target_proximity_pct")]
    pub target_proximity_pct: Decimal,
    /// Retracement fraction past which a setup is reclassified as
    /// momentum exhaustion.
    #[serde(default = "default_exhaustion_retrace")]
    pub exhaustion_retrace: Decimal,
}

fn default_lookback() -> usize {
    50
}

fn default_min_impulse_pct() -> Decimal {
    Decimal::from(5)
}

fn default_min_dominance() -> Decimal {
    Decimal::new(55, 2) // 0.55
}

fn default_osc_period() -> usize {
    14
}

fn default_entry_extreme() -> Decimal {
    Decimal::from(30)
}

fn default_deep_extreme() -> Decimal {
    Decimal::from(20)
}

fn default_recovery_level() -> Decimal {
    Decimal::from(50)
}

fn default_structure_buffer_pct() -> Decimal {
    Decimal::new(5, 1) // 0.5%
}

fn default_htf_confidence() -> Decimal {
    Decimal::new(6, 1) // 0.6
}

fn default_target_proximity_pct() -> Decimal {
    Decimal::ONE
}

fn default_exhaustion_retrace() -> Decimal {
    Decimal::new(618, 3) // 0.618
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            lookback: default_lookback(),
            min_impulse_pct: default_min_impulse_pct(),
            min_dominance: default_min_dominance(),
            osc_period: default_osc_period(),
            entry_extreme: default_entry_extreme(),
            deep_extreme: default_deep_extreme(),
            recovery_level: default_recovery_level(),
            structure_buffer_pct: default_structure_buffer_pct(),
            htf_confidence: default_htf_confidence(),
            target_proximity_pct: default_target_proximity_pct(),
            exhaustion_retrace: default_exhaustion_retrace(),
        }
    }
}

impl DetectorConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.lookback < 10 {
            return Err(format!("lookback ({}) must be at least 10", self.lookback));
        }
        if self.osc_period < 2 {
            return Err(format!(
                "osc_period ({}) must be at least 2",
                self.osc_period
            ));
        }
        if self.min_dominance <= Decimal::ZERO || self.min_dominance > Decimal::ONE {
            return Err(format!(
                "min_dominance ({}) must be in (0, 1]",
                self.min_dominance
            ));
        }
        if self.entry_extreme <= Decimal::ZERO || self.entry_extreme >= Decimal::from(50) {
            return Err(format!(
                "entry_extreme ({}) must be in (0, 50)",
                self.entry_extreme
            ));
        }
        if self.deep_extreme >= self.entry_extreme {
            return Err(format!(
                "deep_extreme ({}) must be below entry_extreme ({})",
                self.deep_extreme, self.entry_extreme
            ));
        }
        if self.recovery_level <= self.entry_extreme {
            return Err(format!(
                "recovery_level ({}) must be above entry_extreme ({})",
                self.recovery_level, self.entry_extreme
            ));
        }
        if self.exhaustion_retrace <= Decimal::ZERO || self.exhaustion_retrace > Decimal::ONE {
            return Err(format!(
                "exhaustion_retrace ({}) must be in (0, 1]",
                self.exhaustion_retrace
            ));
        }
        if self.target_proximity_pct <= Decimal::ZERO {
            return Err(format!(
                "target_proximity_pct ({}) must be positive",
                self.target_proximity_pct
            ));
        }
        Ok(())
    }

    fn mirror(level: Decimal) -> Decimal {
        Decimal::ONE_HUNDRED - level
    }

    /// Oscillator beyond the entry extreme for this direction.
    pub fn is_beyond_entry(&self, direction: Direction, osc: Decimal) -> bool {
        direction.osc_beyond(osc, self.entry_extreme, Self::mirror(self.entry_extreme))
    }

    /// Oscillator beyond the deep (tier-2) extreme for this direction.
    pub fn is_beyond_deep(&self, direction: Direction, osc: Decimal) -> bool {
        direction.osc_beyond(osc, self.deep_extreme, Self::mirror(self.deep_extreme))
    }

    /// Oscillator has completed its recovery for this direction.
    pub fn has_recovered(&self, direction: Direction, osc: Decimal) -> bool {
        match direction {
            Direction::Long => osc >= self.recovery_level,
            Direction::Short => osc <= Self::mirror(self.recovery_level),
        }
    }
}
