//! Date-truncation backtesting.
//!
//! The controller cuts every series to `timestamp.date() <= end_date` and then
//! keeps the interval's standard lookback window, anchored at `end_date` (or at
//! the newest bar when running live). Downstream stages only ever see the cut
//! series, so bars after the cutoff can never influence a result.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{BarSeries, Interval};
use crate::error::ConfigError;

/// How far back an interval's history reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookbackWindow {
    /// The last N distinct dates that have bars.
    TradingDays(u32),
    /// Dates within N calendar days of the anchor.
    CalendarDays(u32),
}

impl LookbackWindow {
    pub fn default_for(interval: Interval) -> Self {
        match interval {
            Interval::M5 | Interval::M10 | Interval::M15 | Interval::M30 => Self::TradingDays(60),
            Interval::H1 | Interval::H2 | Interval::H3 | Interval::H4 => Self::CalendarDays(365),
            Interval::D1 | Interval::W1 => Self::CalendarDays(730),
        }
    }

    fn days(&self) -> u32 {
        match self {
            Self::TradingDays(n) | Self::CalendarDays(n) => *n,
        }
    }
}

/// Per-interval lookback overrides; unlisted intervals use their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookbackConfig {
    overrides: BTreeMap<Interval, LookbackWindow>,
}

impl LookbackConfig {
    pub fn with(mut self, interval: Interval, window: LookbackWindow) -> Self {
        self.overrides.insert(interval, window);
        self
    }

    pub fn window_for(&self, interval: Interval) -> LookbackWindow {
        self.overrides
            .get(&interval)
            .copied()
            .unwrap_or_else(|| LookbackWindow::default_for(interval))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (interval, window) in &self.overrides {
            if window.days() == 0 {
                return Err(ConfigError::invalid(
                    "lookback",
                    format!("window for {interval} must be > 0 days"),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct BacktestController<'a> {
    end_date: Option<NaiveDate>,
    lookback: &'a LookbackConfig,
}

impl<'a> BacktestController<'a> {
    /// `end_date = None` evaluates live, through the newest bar.
    pub fn new(end_date: Option<NaiveDate>, lookback: &'a LookbackConfig) -> Self {
        Self { end_date, lookback }
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    /// Cut `series` to the cutoff and to the lookback window of its interval.
    pub fn truncate(&self, series: &BarSeries) -> BarSeries {
        self.truncate_for(series, series.interval)
    }

    /// Cut `series` using `target`'s lookback window.
    ///
    /// Used for source bars that will be resampled into `target`.
    pub fn truncate_for(&self, series: &BarSeries, target: Interval) -> BarSeries {
        let cut: Vec<_> = match self.end_date {
            Some(end) => series
                .bars
                .iter()
                .filter(|b| b.date() <= end)
                .cloned()
                .collect(),
            None => series.bars.clone(),
        };

        let anchor = match self.end_date.or_else(|| cut.last().map(|b| b.date())) {
            Some(anchor) => anchor,
            None => return BarSeries::new(series.ticker.clone(), series.interval, cut),
        };

        let start = match self.lookback.window_for(target) {
            LookbackWindow::CalendarDays(n) => anchor - Duration::days(i64::from(n)),
            LookbackWindow::TradingDays(n) => {
                let mut dates: Vec<NaiveDate> = cut.iter().map(|b| b.date()).collect();
                dates.dedup();
                let keep = (n as usize).min(dates.len());
                match dates.len().checked_sub(keep).and_then(|i| dates.get(i)) {
                    Some(&first) => first - Duration::days(1),
                    None => anchor,
                }
            }
        };

        let bars = cut.into_iter().filter(|b| b.date() > start).collect();
        BarSeries::new(series.ticker.clone(), series.interval, bars)
    }
}
