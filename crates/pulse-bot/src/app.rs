//! Application wiring: feed -> detection engine -> lifecycle engine.
//!
//! One polling cycle per interval tick. Symbols are processed
//! sequentially, so every (symbol, timeframe, direction) key has a single
//! writer and the engines' synchronous transitions need no further
//! coordination.
//!
//! The higher-timeframe bias is derived from the working series with
//! longer SMA windows; a live deployment substitutes a real
//! `TrendProvider` backed by higher-timeframe candles.

use tokio::time::{interval, Duration};
use tracing::{info, warn};

use pulse_analytics::htf_bias;
use pulse_core::{CandleProvider, Direction, PositionKey, SetupKey};
use pulse_detector::{SetupEngine, SetupEvent};
use pulse_position::{
    ExitReason, LifecycleEngine, LifecycleError, OpenRequest, PercentFeeModel, PositionEvent,
    VolatilityBucket,
};
use pulse_telemetry::SessionStats;

use crate::config::BotConfig;
use crate::error::AppResult;
use crate::feed::CsvCandleFeed;

/// The replay/paper-trading application.
pub struct App {
    config: BotConfig,
    feed: CsvCandleFeed,
    detector: SetupEngine,
    lifecycle: LifecycleEngine<PercentFeeModel>,
    stats: SessionStats,
}

impl App {
    pub fn new(config: BotConfig) -> AppResult<Self> {
        config.validate()?;

        let feed = CsvCandleFeed::load(&config.data_dir, &config.symbols, config.timeframe)?;
        let detector = SetupEngine::new(config.detector.clone())?;
        let cost_model = PercentFeeModel::new(config.taker_fee_bps, config.slippage_bps);
        let lifecycle =
            LifecycleEngine::new(config.lifecycle.clone(), cost_model, config.initial_balance)?;

        Ok(Self {
            config,
            feed,
            detector,
            lifecycle,
            stats: SessionStats::new(),
        })
    }

    /// Run the polling loop until the replay is exhausted or ctrl-c.
    pub async fn run(&mut self) -> AppResult<()> {
        let mut ticker = interval(Duration::from_millis(self.config.poll_interval_ms));
        info!(
            symbols = self.config.symbols.len(),
            timeframe = %self.config.timeframe,
            "starting replay loop"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !self.feed.advance() {
                        info!(cycles = self.feed.position(), "replay exhausted");
                        break;
                    }
                    self.cycle()?;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown requested");
                    break;
                }
            }
        }

        self.stats.log_summary();
        info!(
            balance = %self.lifecycle.account().available(),
            peak = %self.lifecycle.account().peak_balance(),
            max_drawdown_pct = %self.lifecycle.account().max_drawdown_pct(),
            "final account state"
        );
        Ok(())
    }

    /// One evaluation cycle over all symbols and both directions.
    fn cycle(&mut self) -> AppResult<()> {
        let symbols = self.config.symbols.clone();
        for symbol in symbols {
            let candles = match self.feed.candles(&symbol, self.config.timeframe) {
                Ok(c) => c,
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "candle fetch failed");
                    continue;
                }
            };
            if candles.is_empty() {
                continue;
            }
            let last_price = candles[candles.len() - 1].close;
            let trend = htf_bias(&candles, self.config.htf_fast, self.config.htf_slow);

            for direction in Direction::BOTH {
                let setup_key = SetupKey::new(symbol.clone(), self.config.timeframe, direction);
                let position_key = PositionKey::from_setup(&setup_key, self.config.market);

                if let Some(event) = self.detector.evaluate(&setup_key, &candles, trend) {
                    info!(key = %setup_key, event = event.kind(), state = %event.setup().state, "setup event");
                    self.handle_setup_event(&event, &position_key, last_price);
                }

                if self.lifecycle.get(&position_key).is_some() {
                    let events = self.lifecycle.update_price(&position_key, last_price)?;
                    self.handle_position_events(&events);
                }
            }
        }
        Ok(())
    }

    fn handle_setup_event(
        &mut self,
        event: &SetupEvent,
        position_key: &PositionKey,
        last_price: pulse_core::Price,
    ) {
        match event {
            SetupEvent::Created(setup) if setup.is_tradable() => {
                let request = OpenRequest {
                    key: position_key.clone(),
                    direction: setup.key.direction,
                    price: last_price,
                    margin: self.config.margin_per_trade,
                    volatility: VolatilityBucket::Normal,
                };
                match self.lifecycle.open(request) {
                    Ok(event) => self.handle_position_events(std::slice::from_ref(&event)),
                    // Business-rule rejections are expected; report and move on.
                    Err(
                        e @ (LifecycleError::DuplicatePosition(_)
                        | LifecycleError::MaxPositionsReached(_)
                        | LifecycleError::InsufficientMargin { .. }),
                    ) => {
                        warn!(key = %position_key, reason = %e, "entry not taken");
                    }
                    Err(e) => warn!(key = %position_key, error = %e, "open failed"),
                }
            }
            SetupEvent::Removed { reason, .. } => {
                // The pattern this position was built on is gone.
                if self.lifecycle.get(position_key).is_some() {
                    info!(key = %position_key, reason = %reason, "setup gone, closing position");
                    match self.lifecycle.close(position_key, last_price, ExitReason::Manual) {
                        Ok(event) => self.handle_position_events(std::slice::from_ref(&event)),
                        Err(e) => warn!(key = %position_key, error = %e, "close failed"),
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_position_events(&mut self, events: &[PositionEvent]) {
        for event in events {
            info!(
                key = %event.position().key,
                event = event.kind(),
                status = %event.position().status,
                "position event"
            );
            if let PositionEvent::Closed(position) = event {
                if let Some(closed) = &position.closed {
                    self.stats
                        .record_close(closed.realized_pnl, closed.costs.total());
                }
            }
        }
    }
}
