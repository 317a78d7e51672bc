//! CSV directory provider: `<root>/<TICKER>/<interval>.csv`.
//!
//! Files carry a `timestamp,open,high,low,close,volume` header. Timestamps are
//! `YYYY-MM-DD HH:MM:SS` for intraday bars or bare `YYYY-MM-DD` dates.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use signalscope_core::domain::{Bar, BarSeries, Interval};

use super::{cut_at, MarketDataProvider, ProviderError};

#[derive(Debug, Deserialize)]
struct CsvBar {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

#[derive(Debug, Clone)]
pub struct CsvDirectoryProvider {
    root: PathBuf,
}

impl CsvDirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, ticker: &str, interval: Interval) -> PathBuf {
        self.root.join(ticker).join(format!("{}.csv", interval.label()))
    }

    fn read(
        &self,
        path: &Path,
        ticker: &str,
        interval: Interval,
    ) -> Result<Vec<Bar>, ProviderError> {
        let source_name = path.display().to_string();
        let mut reader = ::csv::ReaderBuilder::new()
            .trim(::csv::Trim::All)
            .from_path(path)
            .map_err(|e| ProviderError::Io(format!("{source_name}: {e}")))?;

        let mut bars = Vec::new();
        for (record, row) in reader.deserialize::<CsvBar>().enumerate() {
            let parse_error = |reason: String| ProviderError::Parse {
                source_name: source_name.clone(),
                record: record + 1,
                reason,
            };
            let row = row.map_err(|e| parse_error(e.to_string()))?;
            let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| {
                parse_error(format!("bad timestamp '{}' for {ticker} {interval}", row.timestamp))
            })?;
            if !(row.volume.is_finite() && row.volume >= 0.0) {
                return Err(parse_error(format!("bad volume {}", row.volume)));
            }
            bars.push(Bar {
                timestamp,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume.round() as u64,
            });
        }
        Ok(bars)
    }
}

impl MarketDataProvider for CsvDirectoryProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(
        &self,
        ticker: &str,
        interval: Interval,
        end_date: Option<NaiveDate>,
    ) -> Result<BarSeries, ProviderError> {
        let path = self.path_for(ticker, interval);
        if !path.is_file() {
            return Err(ProviderError::NotFound {
                ticker: ticker.to_string(),
                interval,
            });
        }
        let bars = self.read(&path, ticker, interval)?;
        Ok(cut_at(BarSeries::new(ticker, interval, bars), end_date))
    }
}

/// Parse `YYYY-MM-DD HH:MM:SS` (or with a `T` separator), falling back to a
/// bare date at midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
