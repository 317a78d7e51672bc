//! Market breadth: distinct tickers signalling per calendar day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{Side, SignalEvent};
use crate::error::ConfigError;
use crate::resonance::ResonanceTable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreadthCount {
    pub date: NaiveDate,
    pub variant: String,
    pub side: Side,
    pub count: usize,
}

pub struct MarketBreadthAggregator<'a> {
    table: &'a ResonanceTable,
}

impl<'a> MarketBreadthAggregator<'a> {
    pub fn new(table: &'a ResonanceTable) -> Self {
        Self { table }
    }

    /// Count tickers with a `side` event on any of the variant's intervals,
    /// per day, ascending by date.
    ///
    /// Intraday timestamps collapse to their day; a ticker counts once per day.
    pub fn aggregate<'e>(
        &self,
        variant: &str,
        side: Side,
        events: impl IntoIterator<Item = &'e SignalEvent>,
    ) -> Result<Vec<BreadthCount>, ConfigError> {
        let spec = self.table.get(variant)?;
        let mut by_day: BTreeMap<NaiveDate, BTreeSet<&'e str>> = BTreeMap::new();
        for event in events {
            if event.side == side && spec.intervals.contains(&event.interval) {
                by_day
                    .entry(event.date())
                    .or_default()
                    .insert(event.ticker.as_str());
            }
        }
        Ok(by_day
            .into_iter()
            .map(|(date, tickers)| BreadthCount {
                date,
                variant: variant.to_string(),
                side,
                count: tickers.len(),
            })
            .collect())
    }
}
