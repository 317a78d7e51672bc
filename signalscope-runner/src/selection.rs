//! Best-interval selection over evaluation reports of one side.
//!
//! For MC the favourable direction is a falling price, so every comparison
//! below is made on [`Side::favourable`] returns.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use signalscope_core::domain::{format_hold_time, Interval, Side};
use signalscope_core::waikiki::{EvaluationReport, PeriodStatistic};

/// Candidate holding periods considered by a best-interval table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PeriodRange {
    #[serde(rename = "20")]
    Short,
    #[serde(rename = "50")]
    Medium,
    #[serde(rename = "100")]
    Long,
}

impl PeriodRange {
    pub const ALL: [PeriodRange; 3] = [Self::Short, Self::Medium, Self::Long];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Short => "20",
            Self::Medium => "50",
            Self::Long => "100",
        }
    }

    pub fn periods(&self) -> &'static [usize] {
        match self {
            Self::Short => &[3, 5, 10, 15, 20],
            Self::Medium => &[3, 5, 10, 15, 20, 25, 30, 40, 50],
            Self::Long => &[3, 5, 10, 15, 20, 25, 30, 40, 50, 60, 80, 100],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Offset whose sample count gates eligibility.
    pub eligibility_offset: usize,
    pub min_test_count: usize,
    /// Percent, in the side's favourable direction.
    pub min_avg_return: f64,
    /// Percent.
    pub min_success_rate: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            eligibility_offset: 10,
            min_test_count: 2,
            min_avg_return: 5.0,
            min_success_rate: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestIntervalRow {
    pub ticker: String,
    pub interval: Interval,
    pub side: Side,
    pub hold_time: String,
    /// Mean return at `best_period`, signed as observed.
    pub avg_return: f64,
    pub latest_signal: Option<NaiveDateTime>,
    pub latest_signal_price: Option<f64>,
    pub current_time: Option<NaiveDateTime>,
    pub current_price: Option<f64>,
    pub current_period: Option<usize>,
    pub test_count: usize,
    /// Percent.
    pub success_rate: f64,
    pub best_period: usize,
    pub signal_count: usize,
}

/// Reports of `side` with enough resolved signals and at least one offset
/// clearing the return bar.
pub fn eligible<'a>(
    reports: impl IntoIterator<Item = &'a EvaluationReport>,
    side: Side,
    config: &SelectionConfig,
) -> Vec<&'a EvaluationReport> {
    reports
        .into_iter()
        .filter(|r| r.side == side)
        .filter(|r| {
            r.statistic(config.eligibility_offset)
                .is_some_and(|s| s.sample_count >= config.min_test_count)
        })
        .filter(|r| {
            r.statistics
                .iter()
                .any(|s| side.favourable(s.mean) >= config.min_avg_return)
        })
        .collect()
}

/// Offset among `periods` with the highest favourable mean return.
///
/// Ties go to the shorter period.
pub fn best_period<'a>(
    report: &'a EvaluationReport,
    periods: &[usize],
) -> Option<&'a PeriodStatistic> {
    let mut best: Option<&PeriodStatistic> = None;
    for stat in periods.iter().filter_map(|&p| report.statistic(p)) {
        let better = best.map_or(true, |b| {
            report.side.favourable(stat.mean) > report.side.favourable(b.mean)
        });
        if better {
            best = Some(stat);
        }
    }
    best
}

/// One row per ticker: the interval whose best period in `range` returns most,
/// kept only while its latest signal is still inside that holding period.
pub fn best_intervals<'a>(
    reports: impl IntoIterator<Item = &'a EvaluationReport>,
    side: Side,
    range: PeriodRange,
    config: &SelectionConfig,
) -> Vec<BestIntervalRow> {
    let mut winners: BTreeMap<&str, (&EvaluationReport, &PeriodStatistic)> = BTreeMap::new();
    for report in eligible(reports, side, config) {
        let Some(stat) = best_period(report, range.periods()) else {
            continue;
        };
        let slot = winners.entry(report.ticker.as_str()).or_insert((report, stat));
        if side.favourable(stat.mean) > side.favourable(slot.1.mean) {
            *slot = (report, stat);
        }
    }

    winners
        .into_values()
        .filter(|(_, stat)| side.favourable(stat.mean) >= config.min_avg_return)
        .filter(|(_, stat)| stat.success_rate * 100.0 >= config.min_success_rate)
        .filter(|(report, stat)| report.current_period.is_some_and(|c| c <= stat.period_offset))
        .map(|(report, stat)| row(report, stat))
        .collect()
}

/// Every eligible report at its best period over the whole horizon, newest
/// signal first, filtered by success rate only.
pub fn good_signals<'a>(
    reports: impl IntoIterator<Item = &'a EvaluationReport>,
    side: Side,
    config: &SelectionConfig,
) -> Vec<BestIntervalRow> {
    let mut rows: Vec<BestIntervalRow> = eligible(reports, side, config)
        .into_iter()
        .filter_map(|report| {
            let offsets: Vec<usize> = report.statistics.iter().map(|s| s.period_offset).collect();
            best_period(report, &offsets).map(|stat| row(report, stat))
        })
        .filter(|r| r.success_rate >= config.min_success_rate)
        .collect();
    rows.sort_by(|a, b| {
        b.latest_signal
            .cmp(&a.latest_signal)
            .then_with(|| (&a.ticker, a.interval).cmp(&(&b.ticker, b.interval)))
    });
    rows
}

fn row(report: &EvaluationReport, stat: &PeriodStatistic) -> BestIntervalRow {
    let hold_minutes = report.interval.trading_minutes() * stat.period_offset as u32;
    BestIntervalRow {
        ticker: report.ticker.clone(),
        interval: report.interval,
        side: report.side,
        hold_time: format_hold_time(hold_minutes),
        avg_return: stat.mean,
        latest_signal: report.latest_signal,
        latest_signal_price: report.latest_signal_price,
        current_time: report.current_time,
        current_price: report.current_price,
        current_period: report.current_period,
        test_count: stat.sample_count,
        success_rate: stat.success_rate * 100.0,
        best_period: stat.period_offset,
        signal_count: report.signal_count,
    }
}
