//! The `Position` entity and its state machine.

use chrono::{DateTime, Utc};
use pulse_core::{Direction, PositionKey, Price};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{LifecycleError, LifecycleResult};

/// Lifecycle status of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStatus {
    Queued,
    Executing,
    Open,
    Trailing,
    PartiallyClosed,
    Closing,
    Closed,
    Failed,
}

impl PositionStatus {
    /// The explicit transition table: every allowed `from -> to` pair.
    /// Anything not listed is rejected before mutation.
    #[must_use]
    pub fn allowed_transitions(&self) -> &'static [PositionStatus] {
        use PositionStatus::*;
        match self {
            Queued => &[Executing, Failed],
            Executing => &[Open, Failed],
            Open => &[Trailing, PartiallyClosed, Closing],
            Trailing => &[PartiallyClosed, Closing],
            PartiallyClosed => &[Closing],
            Closing => &[Closed],
            Closed => &[],
            Failed => &[],
        }
    }

    #[must_use]
    pub fn can_transition(&self, to: PositionStatus) -> bool {
        self.allowed_transitions().contains(&to)
    }

    /// Whether the position is holding risk and should receive price ticks.
    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Open | Self::Trailing | Self::PartiallyClosed)
    }

    /// Terminal statuses never change again.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Failed)
    }
}

impl fmt::Display for PositionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Queued => "queued",
            Self::Executing => "executing",
            Self::Open => "open",
            Self::Trailing => "trailing",
            Self::PartiallyClosed => "partially_closed",
            Self::Closing => "closing",
            Self::Closed => "closed",
            Self::Failed => "failed",
        };
        write!(f, "{label}")
    }
}

/// Which protective mechanism (or request) ended the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    Breakeven,
    TrailingStop,
    TakeProfit,
    PartialTarget,
    Custom,
    Manual,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::StopLoss => "closed_sl",
            Self::Breakeven => "closed_breakeven",
            Self::TrailingStop => "closed_trailing",
            Self::TakeProfit => "closed_tp",
            Self::PartialTarget => "closed_partial",
            Self::Custom => "closed_custom",
            Self::Manual => "closed_manual",
        };
        write!(f, "{label}")
    }
}

/// Entry and exit cost deductions applied to a closed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub entry_fee: Decimal,
    pub exit_fee: Decimal,
}

impl CostBreakdown {
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.entry_fee + self.exit_fee
    }
}

/// Terminal fields, present only once the position has closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedDetails {
    pub exit_price: Price,
    pub exit_time: DateTime<Utc>,
    /// Realized P&L net of costs.
    pub realized_pnl: Decimal,
    pub reason: ExitReason,
    pub costs: CostBreakdown,
}

/// An open trade owned by exactly one lifecycle engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: Uuid,
    pub key: PositionKey,
    pub direction: Direction,
    pub status: PositionStatus,

    pub entry_price: Price,
    pub entry_time: DateTime<Utc>,
    /// Margin committed to the trade.
    pub margin: Decimal,
    /// Notional exposure (margin x leverage), reduced by partial closes.
    pub notional: Decimal,
    pub leverage: Decimal,

    // Protective prices.
    pub initial_stop: Price,
    /// Only ever tightens once breakeven or trailing engages.
    pub current_stop: Price,
    pub take_profit: Option<Price>,

    // Trailing state.
    pub trailing_active: bool,
    /// Discrete trail level; monotonically non-decreasing.
    pub trail_level: u32,
    /// Highest return-on-margin seen, percent.
    pub roi_high_water: Decimal,
    /// Set once, irreversible.
    pub breakeven_locked: bool,

    // Live fields.
    pub current_price: Price,
    pub unrealized_pnl: Decimal,
    /// Return on margin, percent.
    pub unrealized_pnl_pct: Decimal,

    /// Entry fee charged by the cost model (settled at close).
    pub entry_fee: Decimal,

    pub closed: Option<ClosedDetails>,
}

impl Position {
    /// Return on margin, in percent, at a given price.
    #[must_use]
    pub fn roi_at(&self, price: Price) -> Decimal {
        if self.entry_price.is_zero() {
            return Decimal::ZERO;
        }
        let change = (price.inner() - self.entry_price.inner()) / self.entry_price.inner();
        self.direction.signed(change) * self.leverage * Decimal::ONE_HUNDRED
    }

    /// Price at which the position shows a given return on margin.
    #[must_use]
    pub fn price_at_roi(&self, roi_pct: Decimal) -> Price {
        let offset = self.direction.signed(roi_pct) / self.leverage;
        self.entry_price.offset_pct(offset)
    }

    /// Whether the protective stop is breached at a price.
    #[must_use]
    pub fn stop_hit(&self, price: Price) -> bool {
        self.direction.breaches(price, self.current_stop)
    }

    /// Whether the take-profit is reached at a price.
    #[must_use]
    pub fn take_profit_hit(&self, price: Price) -> bool {
        match (self.take_profit, self.direction) {
            (Some(tp), Direction::Long) => price >= tp,
            (Some(tp), Direction::Short) => price <= tp,
            (None, _) => false,
        }
    }

    /// Move to a new status, consulting the transition table.
    ///
    /// Rejected transitions leave the position untouched.
    pub fn transition(&mut self, to: PositionStatus) -> LifecycleResult<()> {
        if !self.status.can_transition(to) {
            return Err(LifecycleError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}
