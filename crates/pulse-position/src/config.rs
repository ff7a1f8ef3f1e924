//! Lifecycle engine configuration.
//!
//! Risk thresholds are stated as return-on-margin percentages; the engine
//! converts them to prices through leverage per position.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Configuration for the position lifecycle engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Leverage applied to every position.
    #[serde(default = "default_leverage")]
    pub leverage: Decimal,
    /// Initial stop distance as percent of margin (converted via leverage).
    #[serde(default = "default_initial_stop_roi_pct")]
    pub initial_stop_roi_pct: Decimal,
    /// Optional take-profit as percent of margin.
    #[serde(default)]
    pub take_profit_roi_pct: Option<Decimal>,
    /// Breakeven lock trigger as percent of margin; None disables.
    #[serde(default = "default_breakeven_trigger_pct")]
    pub breakeven_trigger_pct: Option<Decimal>,
    /// Price buffer added beyond entry when locking breakeven, percent.
    #[serde(default)]
    pub breakeven_buffer_pct: Decimal,
    /// ROI that activates trailing, percent.
    #[serde(default = "default_trail_trigger_pct")]
    pub trail_trigger_pct: Decimal,
    /// ROI step per trail level, percent.
    #[serde(default = "default_trail_step_pct")]
    pub trail_step_pct: Decimal,
    /// Maximum concurrent positions.
    #[serde(default = "default_max_positions")]
    pub max_positions: usize,
}

fn default_leverage() -> Decimal {
    Decimal::from(10)
}

fn default_initial_stop_roi_pct() -> Decimal {
    Decimal::from(25)
}

fn default_breakeven_trigger_pct() -> Option<Decimal> {
    Some(Decimal::from(10))
}

fn default_trail_trigger_pct() -> Decimal {
    Decimal::from(10)
}

fn default_trail_step_pct() -> Decimal {
    Decimal::from(5)
}

fn default_max_positions() -> usize {
    5
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            leverage: default_leverage(),
            initial_stop_roi_pct: default_initial_stop_roi_pct(),
            take_profit_roi_pct: None,
            breakeven_trigger_pct: default_breakeven_trigger_pct(),
            breakeven_buffer_pct: Decimal::ZERO,
            trail_trigger_pct: default_trail_trigger_pct(),
            trail_step_pct: default_trail_step_pct(),
            max_positions: default_max_positions(),
        }
    }
}

impl LifecycleConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.leverage <= Decimal::ZERO {
            return Err(format!("leverage ({}) must be positive", self.leverage));
        }
        if self.initial_stop_roi_pct <= Decimal::ZERO {
            return Err(format!(
                "initial_stop_roi_pct ({}) must be positive",
                self.initial_stop_roi_pct
            ));
        }
        if self.trail_step_pct <= Decimal::ZERO {
            return Err(format!(
                "trail_step_pct ({}) must be positive",
                self.trail_step_pct
            ));
        }
        if self.trail_trigger_pct < Decimal::ZERO {
            return Err(format!(
                "trail_trigger_pct ({}) must not be negative",
                self.trail_trigger_pct
            ));
        }
        if let Some(tp) = self.take_profit_roi_pct {
            if tp <= Decimal::ZERO {
                return Err(format!("take_profit_roi_pct ({tp}) must be positive"));
            }
        }
        if let Some(be) = self.breakeven_trigger_pct {
            if be <= Decimal::ZERO {
                return Err(format!("breakeven_trigger_pct ({be}) must be positive"));
            }
        }
        if self.max_positions == 0 {
            return Err("max_positions must be at least 1".to_string());
        }
        Ok(())
    }
}
