//! CSV candle feed for offline replay.
//!
//! Loads one file per symbol (`<data_dir>/<SYMBOL>_<timeframe>.csv`) and
//! exposes a growing prefix of each series so every polling cycle sees
//! exactly one more closed candle, the way a live feed would.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use pulse_core::{Candle, CandleProvider, CoreError, Price, Timeframe};

use crate::error::{AppError, AppResult};

/// One CSV row: unix timestamp in seconds plus OHLCV.
#[derive(Debug, Deserialize)]
struct CandleRow {
    timestamp: i64,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: Decimal,
}

impl CandleRow {
    fn into_candle(self) -> AppResult<Candle> {
        let timestamp: DateTime<Utc> = DateTime::from_timestamp(self.timestamp, 0)
            .ok_or_else(|| AppError::Config(format!("bad timestamp: {}", self.timestamp)))?;
        Ok(Candle::new(
            timestamp,
            Price::new(self.open),
            Price::new(self.high),
            Price::new(self.low),
            Price::new(self.close),
            self.volume,
        ))
    }
}

/// Replay candle feed backed by CSV files.
pub struct CsvCandleFeed {
    timeframe: Timeframe,
    series: HashMap<String, Vec<Candle>>,
    /// Number of candles currently visible to consumers.
    cursor: usize,
    total: usize,
}

impl CsvCandleFeed {
    /// Load the series for every symbol.
    pub fn load(data_dir: &str, symbols: &[String], timeframe: Timeframe) -> AppResult<Self> {
        let mut series = HashMap::new();
        let mut total = 0usize;

        for symbol in symbols {
            let path = Self::file_path(data_dir, symbol, timeframe);
            let candles = Self::load_file(&path)?;
            info!(symbol = %symbol, candles = candles.len(), path = %path.display(), "candle series loaded");
            total = total.max(candles.len());
            series.insert(symbol.clone(), candles);
        }

        Ok(Self {
            timeframe,
            series,
            cursor: 0,
            total,
        })
    }

    fn file_path(data_dir: &str, symbol: &str, timeframe: Timeframe) -> PathBuf {
        Path::new(data_dir).join(format!("{symbol}_{timeframe}.csv"))
    }

    fn load_file(path: &Path) -> AppResult<Vec<Candle>> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut candles = Vec::new();
        for row in reader.deserialize::<CandleRow>() {
            candles.push(row?.into_candle()?);
        }
        candles.sort_by_key(|c| c.timestamp);
        Ok(candles)
    }

    /// Reveal the next candle. Returns false once the replay is finished.
    pub fn advance(&mut self) -> bool {
        if self.cursor >= self.total {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Candles revealed so far.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor
    }
}

impl CandleProvider for CsvCandleFeed {
    fn candles(&self, symbol: &str, timeframe: Timeframe) -> pulse_core::Result<Vec<Candle>> {
        if timeframe != self.timeframe {
            return Err(CoreError::DataUnavailable(format!(
                "feed loaded for {}, requested {timeframe}",
                self.timeframe
            )));
        }
        let series = self
            .series
            .get(symbol)
            .ok_or_else(|| CoreError::DataUnavailable(format!("no series for {symbol}")))?;
        let visible = self.cursor.min(series.len());
        Ok(series[..visible].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(dir: &Path, name: &str, rows: &[&str]) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        writeln!(file, "timestamp,open,high,low,close,volume").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
    }

    #[test]
    fn test_load_and_replay() {
        let dir = std::env::temp_dir().join("pulse_feed_test");
        std::fs::create_dir_all(&dir).unwrap();
        write_fixture(
            &dir,
            "TEST_15m.csv",
            &[
                "1704067200,100,101,99,100.5,1000",
                "1704068100,100.5,102,100,101.5,1200",
                "1704069000,101.5,103,101,102.5,900",
            ],
        );

        let symbols = vec!["TEST".to_string()];
        let mut feed =
            CsvCandleFeed::load(dir.to_str().unwrap(), &symbols, Timeframe::M15).unwrap();

        // Nothing visible before the first advance.
        assert!(feed.candles("TEST", Timeframe::M15).unwrap().is_empty());

        assert!(feed.advance());
        assert_eq!(feed.candles("TEST", Timeframe::M15).unwrap().len(), 1);

        assert!(feed.advance());
        assert!(feed.advance());
        let candles = feed.candles("TEST", Timeframe::M15).unwrap();
        assert_eq!(candles.len(), 3);
        assert!(candles[0].timestamp < candles[2].timestamp);

        // Replay exhausted.
        assert!(!feed.advance());
    }

    #[test]
    fn test_unknown_symbol_is_an_error() {
        let dir = std::env::temp_dir().join("pulse_feed_test_unknown");
        std::fs::create_dir_all(&dir).unwrap();
        write_fixture(&dir, "TEST_15m.csv", &["1704067200,100,101,99,100.5,1000"]);

        let symbols = vec!["TEST".to_string()];
        let feed = CsvCandleFeed::load(dir.to_str().unwrap(), &symbols, Timeframe::M15).unwrap();

        assert!(feed.candles("OTHER", Timeframe::M15).is_err());
        assert!(feed.candles("TEST", Timeframe::H1).is_err());
    }
}
