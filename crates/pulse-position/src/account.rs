//! Balance bookkeeping.
//!
//! The available balance is the one piece of cross-position shared state;
//! it is mutated only inside open/close/partial-close.

use crate::error::{LifecycleError, LifecycleResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Account balance with peak/drawdown tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    available: Decimal,
    peak_balance: Decimal,
    max_drawdown_pct: Decimal,
}

impl Account {
    #[must_use]
    pub fn new(initial_balance: Decimal) -> Self {
        Self {
            available: initial_balance,
            peak_balance: initial_balance,
            max_drawdown_pct: Decimal::ZERO,
        }
    }

    #[must_use]
    pub fn available(&self) -> Decimal {
        self.available
    }

    #[must_use]
    pub fn peak_balance(&self) -> Decimal {
        self.peak_balance
    }

    /// Worst drawdown from peak seen so far, percent.
    #[must_use]
    pub fn max_drawdown_pct(&self) -> Decimal {
        self.max_drawdown_pct
    }

    /// Reserve margin for a new position.
    pub(crate) fn reserve(&mut self, margin: Decimal) -> LifecycleResult<()> {
        if margin > self.available {
            return Err(LifecycleError::InsufficientMargin {
                required: margin,
                available: self.available,
            });
        }
        self.available -= margin;
        debug!(margin = %margin, available = %self.available, "margin reserved");
        Ok(())
    }

    /// Return margin plus realized P&L and refresh peak/drawdown.
    pub(crate) fn release(&mut self, amount: Decimal) {
        self.available += amount;

        if self.available > self.peak_balance {
            self.peak_balance = self.available;
        } else if !self.peak_balance.is_zero() {
            let drawdown = (self.peak_balance - self.available) / self.peak_balance
                * Decimal::ONE_HUNDRED;
            if drawdown > self.max_drawdown_pct {
                self.max_drawdown_pct = drawdown;
            }
        }
        debug!(amount = %amount, available = %self.available, "margin released");
    }
}
