//! In-memory provider for tests and embedding.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use signalscope_core::domain::{BarSeries, Interval};

use super::{cut_at, MarketDataProvider, ProviderError};

#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    series: BTreeMap<(String, Interval), BarSeries>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the series for its (ticker, interval).
    pub fn insert(&mut self, series: BarSeries) {
        self.series
            .insert((series.ticker.clone(), series.interval), series);
    }

    pub fn with(mut self, series: BarSeries) -> Self {
        self.insert(series);
        self
    }

    pub fn tickers(&self) -> Vec<String> {
        let mut tickers: Vec<String> = self.series.keys().map(|(t, _)| t.clone()).collect();
        tickers.dedup();
        tickers
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl MarketDataProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch(
        &self,
        ticker: &str,
        interval: Interval,
        end_date: Option<NaiveDate>,
    ) -> Result<BarSeries, ProviderError> {
        self.series
            .get(&(ticker.to_string(), interval))
            .cloned()
            .map(|s| cut_at(s, end_date))
            .ok_or_else(|| ProviderError::NotFound {
                ticker: ticker.to_string(),
                interval,
            })
    }
}
