//! Application configuration.

use crate::error::{AppError, AppResult};
use pulse_core::{Market, Timeframe};
use pulse_detector::DetectorConfig;
use pulse_position::LifecycleConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Top-level bot configuration, loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Symbols to evaluate each cycle.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
    /// Working timeframe.
    #[serde(default = "default_timeframe")]
    pub timeframe: Timeframe,
    /// Market segment traded.
    #[serde(default = "default_market")]
    pub market: Market,
    /// Polling interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Margin committed per trade.
    #[serde(default = "default_margin_per_trade")]
    pub margin_per_trade: Decimal,
    /// Starting paper balance.
    #[serde(default = "default_initial_balance")]
    pub initial_balance: Decimal,
    /// Directory with per-symbol candle CSV files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Taker fee for the cost model, basis points.
    #[serde(default = "default_taker_fee_bps")]
    pub taker_fee_bps: Decimal,
    /// Slippage for the cost model, basis points.
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: Decimal,
    /// Fast SMA window for the derived trend bias.
    #[serde(default = "default_htf_fast")]
    pub htf_fast: usize,
    /// Slow SMA window for the derived trend bias.
    #[serde(default = "default_htf_slow")]
    pub htf_slow: usize,

    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
}

fn default_symbols() -> Vec<String> {
    vec!["BTCUSDT".to_string()]
}

fn default_timeframe() -> Timeframe {
    Timeframe::M15
}

fn default_market() -> Market {
    Market::Futures
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

fn default_margin_per_trade() -> Decimal {
    Decimal::from(100)
}

fn default_initial_balance() -> Decimal {
    Decimal::from(1_000)
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_taker_fee_bps() -> Decimal {
    Decimal::from(4)
}

fn default_slippage_bps() -> Decimal {
    Decimal::TWO
}

fn default_htf_fast() -> usize {
    10
}

fn default_htf_slow() -> usize {
    30
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            timeframe: default_timeframe(),
            market: default_market(),
            poll_interval_ms: default_poll_interval_ms(),
            margin_per_trade: default_margin_per_trade(),
            initial_balance: default_initial_balance(),
            data_dir: default_data_dir(),
            taker_fee_bps: default_taker_fee_bps(),
            slippage_bps: default_slippage_bps(),
            htf_fast: default_htf_fast(),
            htf_slow: default_htf_slow(),
            detector: DetectorConfig::default(),
            lifecycle: LifecycleConfig::default(),
        }
    }
}

impl BotConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate own fields and nested engine configurations.
    pub fn validate(&self) -> AppResult<()> {
        if self.symbols.is_empty() {
            return Err(AppError::Config("symbols must not be empty".to_string()));
        }
        if self.margin_per_trade <= Decimal::ZERO {
            return Err(AppError::Config(format!(
                "margin_per_trade ({}) must be positive",
                self.margin_per_trade
            )));
        }
        if self.initial_balance <= Decimal::ZERO {
            return Err(AppError::Config(format!(
                "initial_balance ({}) must be positive",
                self.initial_balance
            )));
        }
        if self.htf_fast == 0 || self.htf_slow <= self.htf_fast {
            return Err(AppError::Config(format!(
                "htf windows invalid: fast {} slow {}",
                self.htf_fast, self.htf_slow
            )));
        }
        self.detector.validate().map_err(AppError::Config)?;
        self.lifecycle.validate().map_err(AppError::Config)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(BotConfig::default().validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml_str = r#"
            symbols = ["BTCUSDT", "ETHUSDT"]
            timeframe = "1h"

            [detector]
            min_impulse_pct = "4"

            [lifecycle]
            leverage = "5"
        "#;
        let config: BotConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.symbols.len(), 2);
        assert_eq!(config.timeframe, Timeframe::H1);
        assert_eq!(config.detector.min_impulse_pct, Decimal::from(4));
        assert_eq!(config.lifecycle.leverage, Decimal::from(5));
        // Unspecified sections keep their defaults.
        assert_eq!(config.detector.osc_period, 14);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_symbols() {
        let config = BotConfig {
            symbols: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
