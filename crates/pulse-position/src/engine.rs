//! Position lifecycle engine.
//!
//! Owns positions in a map keyed by `PositionKey`, plus the account
//! balance. All operations are synchronous, all-or-nothing state
//! transitions: a rejection is returned as a typed error and mutates
//! nothing. Callers serialize access per key (single writer); balance is
//! touched only inside open/close/partial-close.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use pulse_core::{Direction, PositionKey, Price};

use crate::account::Account;
use crate::config::LifecycleConfig;
use crate::costs::{CostModel, VolatilityBucket};
use crate::error::{LifecycleError, LifecycleResult};
use crate::events::PositionEvent;
use crate::position::{
    ClosedDetails, CostBreakdown, ExitReason, Position, PositionStatus,
};

/// A directional entry request.
#[derive(Debug, Clone)]
pub struct OpenRequest {
    pub key: PositionKey,
    pub direction: Direction,
    pub price: Price,
    pub margin: Decimal,
    pub volatility: VolatilityBucket,
}

/// Caller-supplied exit predicate, checked after stop and take-profit.
pub type ExitCondition<'a> = &'a dyn Fn(&Position) -> bool;

/// Position lifecycle engine instance ("bot").
///
/// Each position is owned by exactly one engine instance; closed
/// positions move to an immutable collection and are never touched again.
pub struct LifecycleEngine<C: CostModel> {
    config: LifecycleConfig,
    cost_model: C,
    positions: HashMap<PositionKey, Position>,
    closed: Vec<Position>,
    account: Account,
}

impl<C: CostModel> LifecycleEngine<C> {
    /// Create an engine with a validated configuration.
    pub fn new(
        config: LifecycleConfig,
        cost_model: C,
        initial_balance: Decimal,
    ) -> LifecycleResult<Self> {
        config.validate().map_err(LifecycleError::Config)?;
        Ok(Self {
            config,
            cost_model,
            positions: HashMap::new(),
            closed: Vec::new(),
            account: Account::new(initial_balance),
        })
    }

    // ------------------------------------------------------------------
    // Open
    // ------------------------------------------------------------------

    /// Open a position from an entry signal.
    ///
    /// Rejects on duplicate key, position limit, or insufficient margin,
    /// with no side effects. On acceptance the position walks
    /// queued -> executing -> open through the transition table, margin is
    /// reserved, and the initial stop (and optional take-profit) is set.
    pub fn open(&mut self, request: OpenRequest) -> LifecycleResult<PositionEvent> {
        if self.positions.contains_key(&request.key) {
            return Err(LifecycleError::DuplicatePosition(request.key.to_string()));
        }
        if self.positions.len() >= self.config.max_positions {
            return Err(LifecycleError::MaxPositionsReached(
                self.config.max_positions,
            ));
        }
        // Reserve checks the balance and is the last fallible step, so a
        // rejection leaves nothing to roll back.
        self.account.reserve(request.margin)?;

        let fill = self.cost_model.costs(
            request.price,
            request.margin * self.config.leverage,
            request.direction,
            request.volatility,
        );

        let mut position = Position {
            id: Uuid::new_v4(),
            key: request.key.clone(),
            direction: request.direction,
            status: PositionStatus::Queued,
            entry_price: fill.effective_price,
            entry_time: Utc::now(),
            margin: request.margin,
            notional: request.margin * self.config.leverage,
            leverage: self.config.leverage,
            initial_stop: Price::ZERO,
            current_stop: Price::ZERO,
            take_profit: None,
            trailing_active: false,
            trail_level: 0,
            roi_high_water: Decimal::ZERO,
            breakeven_locked: false,
            current_price: fill.effective_price,
            unrealized_pnl: Decimal::ZERO,
            unrealized_pnl_pct: Decimal::ZERO,
            entry_fee: fill.fees,
            closed: None,
        };

        let stop = position.price_at_roi(-self.config.initial_stop_roi_pct);
        position.initial_stop = stop;
        position.current_stop = stop;
        position.take_profit = self
            .config
            .take_profit_roi_pct
            .map(|roi| position.price_at_roi(roi));

        position.transition(PositionStatus::Executing)?;
        position.transition(PositionStatus::Open)?;

        info!(
            key = %position.key,
            direction = %position.direction,
            entry = %position.entry_price,
            margin = %position.margin,
            notional = %position.notional,
            stop = %position.current_stop,
            "position opened"
        );

        self.positions.insert(request.key, position.clone());
        Ok(PositionEvent::Opened(position))
    }

    /// Mark a queued/executing position as failed.
    ///
    /// Margin is returned; the transition table rejects this for any
    /// position that is already open.
    pub fn fail(&mut self, key: &PositionKey, reason: &str) -> LifecycleResult<()> {
        let position = self
            .positions
            .get_mut(key)
            .ok_or_else(|| LifecycleError::NotFound(key.to_string()))?;

        position.transition(PositionStatus::Failed)?;
        warn!(%key, reason, "position failed");

        let failed = match self.positions.remove(key) {
            Some(p) => p,
            None => return Ok(()),
        };
        self.account.release(failed.margin);
        self.closed.push(failed);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Process a price tick for a position.
    ///
    /// Recomputes unrealized P&L and the ROI high-water mark, then
    /// evaluates in fixed priority: breakeven lock, trailing
    /// activation/advance, exit conditions (stop, take-profit, custom).
    pub fn update_price(
        &mut self,
        key: &PositionKey,
        price: Price,
    ) -> LifecycleResult<Vec<PositionEvent>> {
        self.update_price_with_exit(key, price, None)
    }

    /// `update_price` with a caller-supplied exit condition.
    pub fn update_price_with_exit(
        &mut self,
        key: &PositionKey,
        price: Price,
        custom_exit: Option<ExitCondition<'_>>,
    ) -> LifecycleResult<Vec<PositionEvent>> {
        let config = self.config.clone();
        let position = self
            .positions
            .get_mut(key)
            .ok_or_else(|| LifecycleError::NotFound(key.to_string()))?;
        if !position.status.is_live() {
            return Err(LifecycleError::NotLive(key.to_string()));
        }

        let mut events = Vec::new();

        let roi = position.roi_at(price);
        position.current_price = price;
        position.unrealized_pnl_pct = roi;
        position.unrealized_pnl = position.margin * roi / Decimal::ONE_HUNDRED;
        if roi > position.roi_high_water {
            position.roi_high_water = roi;
        }

        // 1. Breakeven lock: once, irreversibly.
        if let Some(trigger) = config.breakeven_trigger_pct {
            if !position.breakeven_locked && roi >= trigger {
                let locked_stop = position
                    .entry_price
                    .offset_pct(position.direction.signed(config.breakeven_buffer_pct));
                if position.direction.favors(locked_stop, position.current_stop) {
                    position.current_stop = locked_stop;
                }
                position.breakeven_locked = true;
                info!(%key, stop = %position.current_stop, "breakeven locked");
                events.push(PositionEvent::BreakevenLocked(position.clone()));
            }
        }

        // 2. Trailing activation and advance.
        if roi >= config.trail_trigger_pct {
            if !position.trailing_active {
                position.trailing_active = true;
                if position.status == PositionStatus::Open {
                    position.transition(PositionStatus::Trailing)?;
                }
                info!(%key, roi = %roi, "trailing activated");
                events.push(PositionEvent::TrailingActivated(position.clone()));
            }

            let level = ((roi - config.trail_trigger_pct) / config.trail_step_pct)
                .floor()
                .to_u32()
                .map(|l| l + 1);
            if let Some(level) = level {
                if level > position.trail_level {
                    let locked_roi =
                        Decimal::from(level - 1) * config.trail_step_pct;
                    let candidate = position.price_at_roi(locked_roi);
                    // The stop only ever tightens.
                    if position.direction.favors(candidate, position.current_stop) {
                        position.current_stop = candidate;
                    }
                    position.trail_level = level;
                    debug!(
                        %key,
                        level,
                        locked_roi = %locked_roi,
                        stop = %position.current_stop,
                        "trail level advanced"
                    );
                    events.push(PositionEvent::TrailingAdvanced {
                        position: position.clone(),
                        level,
                    });
                }
            }
        }

        // 3. Exit conditions, in priority order. The stop label reflects
        // the protective mechanism active at the moment of the hit.
        let exit = if position.stop_hit(price) {
            let reason = if position.trailing_active {
                ExitReason::TrailingStop
            } else if position.breakeven_locked {
                ExitReason::Breakeven
            } else {
                ExitReason::StopLoss
            };
            Some((position.current_stop, reason))
        } else if position.take_profit_hit(price) {
            position.take_profit.map(|tp| (tp, ExitReason::TakeProfit))
        } else if custom_exit.is_some_and(|check| check(position)) {
            Some((price, ExitReason::Custom))
        } else {
            None
        };

        if let Some((exit_price, reason)) = exit {
            events.push(self.finalize_close(key, exit_price, reason)?);
        }

        Ok(events)
    }

    // ------------------------------------------------------------------
    // Close
    // ------------------------------------------------------------------

    /// Close a live position at a price, for an explicit reason.
    pub fn close(
        &mut self,
        key: &PositionKey,
        price: Price,
        reason: ExitReason,
    ) -> LifecycleResult<PositionEvent> {
        let position = self
            .positions
            .get(key)
            .ok_or_else(|| LifecycleError::NotFound(key.to_string()))?;
        if !position.status.is_live() {
            return Err(LifecycleError::NotLive(key.to_string()));
        }
        self.finalize_close(key, price, reason)
    }

    /// Close a fixed fraction of the notional at an intermediate target.
    ///
    /// Prorates the entry fee, returns prorated margin plus P&L to the
    /// balance, and leaves the remainder live under `PartiallyClosed`,
    /// still subject to the full trailing/stop logic.
    pub fn partial_close(
        &mut self,
        key: &PositionKey,
        price: Price,
        fraction: Decimal,
    ) -> LifecycleResult<PositionEvent> {
        if fraction <= Decimal::ZERO || fraction >= Decimal::ONE {
            return Err(LifecycleError::InvalidFraction(fraction));
        }

        let position = self
            .positions
            .get_mut(key)
            .ok_or_else(|| LifecycleError::NotFound(key.to_string()))?;
        if !position.status.is_live() {
            return Err(LifecycleError::NotLive(key.to_string()));
        }
        if position.status != PositionStatus::PartiallyClosed {
            position.transition(PositionStatus::PartiallyClosed)?;
        }

        let closed_notional = position.notional * fraction;
        let closed_margin = position.margin * fraction;
        let entry_fee_part = position.entry_fee * fraction;

        let fill = self.cost_model.costs(
            price,
            closed_notional,
            position.direction.opposite(),
            VolatilityBucket::Normal,
        );
        let raw_pnl = raw_pnl(
            position.direction,
            position.entry_price,
            fill.effective_price,
            closed_notional,
        );
        let realized = raw_pnl - entry_fee_part - fill.fees;

        position.notional -= closed_notional;
        position.margin -= closed_margin;
        position.entry_fee -= entry_fee_part;
        position.current_price = price;

        self.account.release(closed_margin + realized);

        info!(
            %key,
            fraction = %fraction,
            realized = %realized,
            remaining_notional = %position.notional,
            "position partially closed"
        );

        Ok(PositionEvent::PartiallyClosed {
            position: position.clone(),
            fraction,
            realized_pnl: realized,
        })
    }

    /// Terminal close: settle costs, return margin and P&L to the
    /// balance, and move the position to the closed collection. The
    /// position is removed from the active map in the same operation, so
    /// no position is ever closed twice.
    fn finalize_close(
        &mut self,
        key: &PositionKey,
        price: Price,
        reason: ExitReason,
    ) -> LifecycleResult<PositionEvent> {
        let mut position = self
            .positions
            .remove(key)
            .ok_or_else(|| LifecycleError::NotFound(key.to_string()))?;

        position.transition(PositionStatus::Closing)?;

        let fill = self.cost_model.costs(
            price,
            position.notional,
            position.direction.opposite(),
            VolatilityBucket::Normal,
        );
        let raw = raw_pnl(
            position.direction,
            position.entry_price,
            fill.effective_price,
            position.notional,
        );
        let realized = raw - position.entry_fee - fill.fees;

        position.transition(PositionStatus::Closed)?;
        position.current_price = price;
        position.unrealized_pnl = Decimal::ZERO;
        position.unrealized_pnl_pct = Decimal::ZERO;
        position.closed = Some(ClosedDetails {
            exit_price: fill.effective_price,
            exit_time: Utc::now(),
            realized_pnl: realized,
            reason,
            costs: CostBreakdown {
                entry_fee: position.entry_fee,
                exit_fee: fill.fees,
            },
        });

        self.account.release(position.margin + realized);

        info!(
            %key,
            %reason,
            exit = %fill.effective_price,
            realized = %realized,
            balance = %self.account.available(),
            "position closed"
        );

        self.closed.push(position.clone());
        Ok(PositionEvent::Closed(position))
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub fn get(&self, key: &PositionKey) -> Option<&Position> {
        self.positions.get(key)
    }

    #[must_use]
    pub fn open_count(&self) -> usize {
        self.positions.len()
    }

    /// Closed (and failed) positions, in close order.
    #[must_use]
    pub fn closed_positions(&self) -> &[Position] {
        &self.closed
    }

    #[must_use]
    pub fn account(&self) -> &Account {
        &self.account
    }

    #[must_use]
    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Iterate over live positions.
    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }
}

/// Raw P&L from entry to exit, scaled by notional and direction.
fn raw_pnl(direction: Direction, entry: Price, exit: Price, notional: Decimal) -> Decimal {
    if entry.is_zero() {
        return Decimal::ZERO;
    }
    let change = (exit.inner() - entry.inner()) / entry.inner();
    direction.signed(change) * notional
}
