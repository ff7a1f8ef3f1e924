//! Core domain types for the pulse swing bot.
//!
//! This crate provides the fundamental types shared by the detection and
//! lifecycle engines:
//! - `Price`: precision-safe price arithmetic
//! - `Candle`, `Timeframe`: market data primitives
//! - `Direction`: long/short tag carrying the direction-dependent comparators
//! - `SetupKey`, `PositionKey`: arena-map keys for engine-owned entities
//! - `CandleProvider`, `TrendProvider`: collaborator contracts

pub mod candle;
pub mod decimal;
pub mod direction;
pub mod error;
pub mod key;
pub mod provider;
pub mod trend;

pub use candle::{Candle, Timeframe};
pub use decimal::Price;
pub use direction::Direction;
pub use error::{CoreError, Result};
pub use key::{Market, PositionKey, SetupKey};
pub use provider::{CandleProvider, TrendProvider};
pub use trend::{HtfTrend, TrendBias};
