//! Setup detection engine.
//!
//! Owns the tracked setups in a map keyed by (symbol, timeframe,
//! direction). `evaluate` is a synchronous, non-blocking state transition:
//! one call per key per polling cycle, single writer per key. The engine
//! performs no I/O; candles and trend signals are handed in by the
//! orchestrator.
//!
//! Missing or insufficient input (too few candles, oscillator warm-up)
//! makes the cycle a no-op for that key: no state change, no error.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info, warn};

use pulse_analytics::{
    crossed_into_extreme, detect_divergence, detect_impulse, pullback_extreme, volume_contraction,
    OscillatorSeries,
};
use pulse_core::{Candle, Direction, HtfTrend, SetupKey};
use rust_decimal::Decimal;

use crate::config::DetectorConfig;
use crate::error::{DetectorError, DetectorResult};
use crate::events::{RemovalReason, SetupEvent};
use crate::setup::{classify, HtfAlignment, ImpulseRef, Setup, SetupState, Tier};

/// Setup detection engine instance.
///
/// Multiple independent instances (one per strategy variant) can coexist;
/// there is no ambient state.
pub struct SetupEngine {
    config: DetectorConfig,
    setups: HashMap<SetupKey, Setup>,
}

impl SetupEngine {
    /// Create an engine with a validated configuration.
    pub fn new(config: DetectorConfig) -> DetectorResult<Self> {
        config.validate().map_err(DetectorError::Config)?;
        Ok(Self {
            config,
            setups: HashMap::new(),
        })
    }

    /// Run one evaluation cycle for a key.
    ///
    /// Creates a setup when none is tracked and the full entry pattern is
    /// present, otherwise advances the tracked setup's state machine.
    /// Returns the resulting event, if any. A `Removed` event means the
    /// setup was deleted from the tracked map in this same call.
    pub fn evaluate(
        &mut self,
        key: &SetupKey,
        candles: &[Candle],
        htf_trend: Option<HtfTrend>,
    ) -> Option<SetupEvent> {
        if candles.is_empty() {
            return None;
        }

        if self.setups.contains_key(key) {
            self.update_tracked(key, candles)
        } else {
            self.try_create(key, candles, htf_trend)
        }
    }

    /// Currently tracked setup for a key.
    #[must_use]
    pub fn get(&self, key: &SetupKey) -> Option<&Setup> {
        self.setups.get(key)
    }

    /// Number of tracked setups.
    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.setups.len()
    }

    /// Iterate over tracked setups.
    pub fn iter(&self) -> impl Iterator<Item = &Setup> {
        self.setups.values()
    }

    #[must_use]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    fn try_create(
        &mut self,
        key: &SetupKey,
        candles: &[Candle],
        htf_trend: Option<HtfTrend>,
    ) -> Option<SetupEvent> {
        let cfg = &self.config;
        let direction = key.direction;
        let last_idx = candles.len() - 1;
        let last_price = candles[last_idx].close;

        // 1. Strongest qualifying impulse in the lookback window.
        let impulse = detect_impulse(
            candles,
            cfg.min_impulse_pct,
            cfg.min_dominance,
            cfg.lookback,
        )?;

        // 2. Up-impulses seed longs only, down-impulses shorts only.
        if impulse.direction != direction {
            return None;
        }

        // 3. Higher-timeframe gate: a confident signal must agree.
        let htf_alignment = match htf_trend {
            Some(trend) => {
                if trend.is_confident(cfg.htf_confidence) && !trend.aligns_with(direction) {
                    debug!(%key, bias = %trend.bias, "rejected by higher-timeframe trend");
                    return None;
                }
                if trend.aligns_with(direction) {
                    HtfAlignment::Confirmed
                } else {
                    HtfAlignment::Unconfirmed
                }
            }
            None => HtfAlignment::Unknown,
        };

        // 4. Price must still sit strictly between the impulse endpoints.
        let impulse_ref = ImpulseRef {
            direction: impulse.direction,
            start_price: impulse.start_price,
            end_price: impulse.end_price,
            start_time: candles[impulse.start_idx].timestamp,
            end_time: candles[impulse.end_idx].timestamp,
            percent_move: impulse.percent_move,
            dominance: impulse.dominance,
        };
        if !impulse_ref.contains(last_price) {
            return None;
        }

        // 5. Oscillator beyond the entry extreme, and this is the first
        // excursion since the impulse ended. Warm-up indices have no
        // reading and do not count.
        let series = OscillatorSeries::compute(candles, cfg.osc_period)?;
        let current = series.latest()?;
        if !cfg.is_beyond_entry(direction, current) {
            return None;
        }
        let beyond_readings = (impulse.end_idx + 1..=last_idx)
            .filter_map(|idx| series.value_at(idx))
            .filter(|&v| cfg.is_beyond_entry(direction, v))
            .count();
        if beyond_readings > 1 {
            debug!(%key, beyond_readings, "not the first extreme, rejecting");
            return None;
        }

        let previous = series.previous();
        let crossed = previous.map_or(false, |prev| {
            crossed_into_extreme(
                prev,
                current,
                direction,
                cfg.entry_extreme,
                Decimal::ONE_HUNDRED - cfg.entry_extreme,
            )
        });

        // 6. Structure-based protective price from the pullback extreme.
        let extreme = pullback_extreme(candles, impulse.end_idx, direction)?;
        let protective_price = extreme.offset_pct(direction.signed(-cfg.structure_buffer_pct));

        // 7. Position-building tier.
        let tier = if cfg.is_beyond_deep(direction, current) {
            Tier::Two
        } else {
            Tier::One
        };
        let adds_allowed =
            tier.allows_adds() && previous.map_or(false, |prev| direction.osc_deeper(current, prev));

        // 8. Momentum-exhaustion reclassification.
        let classification = classify(&impulse_ref, last_price, cfg.exhaustion_retrace);

        // 9. Volume and divergence annotations.
        let vol_contraction = volume_contraction(candles, &impulse);
        let divergence = detect_divergence(candles, &series, direction);

        // 10. Initial state; non-actionable candidates are not tracked.
        let state = match tier {
            Tier::Two => SetupState::DeepExtreme,
            Tier::One => SetupState::Triggered,
        };

        let now = Utc::now();
        let setup = Setup {
            key: key.clone(),
            state,
            impulse: impulse_ref,
            osc_value: current,
            osc_at_trigger: current,
            osc_previous: previous,
            osc_trend: series.short_term_trend(),
            crossed_on_trigger: crossed,
            pullback_extreme: extreme,
            protective_price,
            htf_alignment,
            volume_contraction: vol_contraction,
            divergence,
            classification,
            tier,
            adds_allowed,
            last_price,
            detected_at: now,
            triggered_at: now,
            last_updated_at: now,
        };

        info!(
            %key,
            state = %setup.state,
            osc = %current,
            impulse_pct = %setup.impulse.percent_move,
            dominance = %setup.impulse.dominance,
            protective = %setup.protective_price,
            ?classification,
            "setup created"
        );

        self.setups.insert(key.clone(), setup.clone());
        Some(SetupEvent::Created(setup))
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    fn update_tracked(&mut self, key: &SetupKey, candles: &[Candle]) -> Option<SetupEvent> {
        let cfg = self.config.clone();
        let series = OscillatorSeries::compute(candles, cfg.osc_period)?;
        let current = series.latest()?;

        let setup = self.setups.get_mut(key)?;
        let direction = setup.direction();
        let last_price = candles[candles.len() - 1].close;

        // Invalidation checks, in order.
        let removal = if setup.impulse.broken_by(last_price) {
            Some(RemovalReason::StructureFailure)
        } else if last_price.within_pct_of(setup.impulse.end_price, cfg.target_proximity_pct) {
            Some(RemovalReason::TargetReached)
        } else if setup.state == SetupState::Reversing
            && cfg.is_beyond_entry(direction, current)
        {
            Some(RemovalReason::SecondExcursion)
        } else if setup.state == SetupState::Reversing && cfg.has_recovered(direction, current) {
            Some(RemovalReason::RecoveryComplete)
        } else {
            None
        };

        // Oscillator tracking moves with every cycle.
        let previous = setup.osc_value;
        setup.osc_previous = Some(previous);
        setup.osc_value = current;
        setup.osc_trend = series.short_term_trend();
        setup.last_price = last_price;
        setup.last_updated_at = Utc::now();

        if let Some(reason) = removal {
            Self::apply_transition(setup, SetupState::PlayedOut);
            let removed = self.setups.remove(key)?;
            info!(%key, %reason, "setup played out");
            return Some(SetupEvent::Removed {
                setup: removed,
                reason,
            });
        }

        // Threshold-driven state movement.
        let next = if cfg.is_beyond_deep(direction, current) {
            SetupState::DeepExtreme
        } else if cfg.is_beyond_entry(direction, current) {
            SetupState::Triggered
        } else if setup.state.is_actionable() {
            SetupState::Reversing
        } else {
            setup.state
        };
        if next != setup.state {
            Self::apply_transition(setup, next);
        }

        // Advancing to the deep extreme upgrades the tier; it never drops.
        if setup.state == SetupState::DeepExtreme && setup.tier == Tier::One {
            setup.tier = Tier::Two;
        }
        setup.adds_allowed = setup.tier.allows_adds()
            && setup.state.is_actionable()
            && direction.osc_deeper(current, previous);

        // The pullback extreme may deepen while the setup is active; the
        // protective price follows it, never loosening.
        if let Some(anchor) = candles
            .iter()
            .position(|c| c.timestamp > setup.impulse.end_time)
        {
            if let Some(extreme) = pullback_extreme(candles, anchor, direction) {
                let deeper = match direction {
                    Direction::Long => extreme < setup.pullback_extreme,
                    Direction::Short => extreme > setup.pullback_extreme,
                };
                if deeper {
                    setup.pullback_extreme = extreme;
                    setup.protective_price =
                        extreme.offset_pct(direction.signed(-cfg.structure_buffer_pct));
                }
            }
        }

        Some(SetupEvent::Updated(setup.clone()))
    }

    fn apply_transition(setup: &mut Setup, to: SetupState) {
        if setup.state == to {
            return;
        }
        if !setup.state.can_transition(to) {
            warn!(
                key = %setup.key,
                from = %setup.state,
                to = %to,
                "illegal setup transition rejected"
            );
            return;
        }
        debug!(key = %setup.key, from = %setup.state, to = %to, "setup transition");
        setup.state = to;
    }
}
