//! Per-run trading statistics.
//!
//! Fed by closed-position results; logged on demand so a run ends with a
//! readable summary even when no persistence collaborator is attached.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Aggregated statistics for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub started_at: DateTime<Utc>,
    pub trades: u64,
    pub wins: u64,
    pub losses: u64,
    pub net_pnl: Decimal,
    pub total_fees: Decimal,
    pub best_trade: Decimal,
    pub worst_trade: Decimal,
}

impl SessionStats {
    #[must_use]
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            trades: 0,
            wins: 0,
            losses: 0,
            net_pnl: Decimal::ZERO,
            total_fees: Decimal::ZERO,
            best_trade: Decimal::ZERO,
            worst_trade: Decimal::ZERO,
        }
    }

    /// Record a closed trade.
    pub fn record_close(&mut self, realized_pnl: Decimal, fees: Decimal) {
        self.trades += 1;
        if realized_pnl.is_sign_positive() && !realized_pnl.is_zero() {
            self.wins += 1;
        } else if realized_pnl.is_sign_negative() {
            self.losses += 1;
        }
        self.net_pnl += realized_pnl;
        self.total_fees += fees;
        if realized_pnl > self.best_trade {
            self.best_trade = realized_pnl;
        }
        if realized_pnl < self.worst_trade {
            self.worst_trade = realized_pnl;
        }
    }

    /// Win rate in 0..1, None before the first trade.
    #[must_use]
    pub fn win_rate(&self) -> Option<Decimal> {
        if self.trades == 0 {
            return None;
        }
        Some(Decimal::from(self.wins) / Decimal::from(self.trades))
    }

    /// Emit the summary through tracing.
    pub fn log_summary(&self) {
        info!(
            trades = self.trades,
            wins = self.wins,
            losses = self.losses,
            net_pnl = %self.net_pnl,
            total_fees = %self.total_fees,
            best = %self.best_trade,
            worst = %self.worst_trade,
            win_rate = ?self.win_rate(),
            "session summary"
        );
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_records_wins_and_losses() {
        let mut stats = SessionStats::new();

        stats.record_close(dec!(25), dec!(0.8));
        stats.record_close(dec!(-10), dec!(0.8));
        stats.record_close(dec!(5), dec!(0.8));

        assert_eq!(stats.trades, 3);
        assert_eq!(stats.wins, 2);
        assert_eq!(stats.losses, 1);
        assert_eq!(stats.net_pnl, dec!(20));
        assert_eq!(stats.total_fees, dec!(2.4));
        assert_eq!(stats.best_trade, dec!(25));
        assert_eq!(stats.worst_trade, dec!(-10));
    }

    #[test]
    fn test_win_rate() {
        let mut stats = SessionStats::new();
        assert!(stats.win_rate().is_none());

        stats.record_close(dec!(10), dec!(0));
        stats.record_close(dec!(-5), dec!(0));
        assert_eq!(stats.win_rate().unwrap(), dec!(0.5));
    }

    #[test]
    fn test_breakeven_trade_counts_neither() {
        let mut stats = SessionStats::new();
        stats.record_close(dec!(0), dec!(0.4));

        assert_eq!(stats.trades, 1);
        assert_eq!(stats.wins, 0);
        assert_eq!(stats.losses, 0);
    }
}
