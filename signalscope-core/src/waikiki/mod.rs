//! Forward-return evaluation of signal events ("Waikiki").
//!
//! For every resolved event (one with at least `horizon` bars after it) the
//! evaluator samples the return and volume ratio at offsets `0..=horizon` and
//! aggregates the most recent `max_signals` of them into per-offset statistics.
//! The latest event, when still unresolved, is reported on its own as the
//! current trajectory and never enters the statistics.

pub mod stats;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{BarSeries, Interval, Side, SignalEvent};
use crate::error::ComputeError;

pub use stats::{percentile, summarize, PeriodStatistic, Summary};

/// Return and volume ratio of one event at one forward offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSample {
    pub ticker: String,
    pub interval: Interval,
    pub side: Side,
    /// Ordinal of the event within its (ticker, interval, side) event list.
    pub signal_id: usize,
    pub period_offset: usize,
    pub return_pct: f64,
    /// Absent when the signal bar traded no volume.
    pub volume_ratio: Option<f64>,
}

/// Partial samples of the latest, still-unresolved event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentTrajectory {
    pub signal_id: usize,
    pub timestamp: NaiveDateTime,
    pub price: f64,
    /// Bars elapsed since the event fired.
    pub current_period: usize,
    pub samples: Vec<ReturnSample>,
}

/// Everything the evaluator derives for one (ticker, interval, side).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub ticker: String,
    pub interval: Interval,
    pub side: Side,
    pub signal_count: usize,
    pub latest_signal: Option<NaiveDateTime>,
    pub latest_signal_price: Option<f64>,
    pub current_time: Option<NaiveDateTime>,
    pub current_price: Option<f64>,
    /// Bars between the latest event and the last bar.
    pub current_period: Option<usize>,
    /// Samples of the resolved events that feed `statistics`.
    pub samples: Vec<ReturnSample>,
    pub statistics: Vec<PeriodStatistic>,
    pub current: Option<CurrentTrajectory>,
    /// Extremes of the per-offset mean returns.
    pub max_return: Option<f64>,
    pub min_return: Option<f64>,
}

impl EvaluationReport {
    pub fn statistic(&self, offset: usize) -> Option<&PeriodStatistic> {
        self.statistics.iter().find(|s| s.period_offset == offset)
    }
}

/// Forward-return evaluator with a horizon and a recency cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardReturnEvaluator {
    pub horizon: usize,
    pub max_signals: usize,
}

impl ForwardReturnEvaluator {
    pub fn new(horizon: usize, max_signals: usize) -> Self {
        Self {
            horizon,
            max_signals,
        }
    }

    /// Whether an event at `bar_index` has `horizon` bars after it.
    pub fn is_resolved(&self, bar_index: usize, len: usize) -> bool {
        bar_index + self.horizon < len
    }

    /// Evaluate `events` (chronological, all of `side`) against `series`.
    pub fn evaluate(
        &self,
        series: &BarSeries,
        side: Side,
        events: &[SignalEvent],
    ) -> Result<EvaluationReport, ComputeError> {
        let len = series.len();
        let last = series.last();

        let resolved: Vec<(usize, &SignalEvent)> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| self.is_resolved(e.bar_index, len))
            .collect();
        let recent = &resolved[resolved.len().saturating_sub(self.max_signals)..];

        let mut samples = Vec::with_capacity(recent.len() * (self.horizon + 1));
        for &(signal_id, event) in recent {
            samples.extend(self.sample(series, side, signal_id, event, self.horizon)?);
        }

        let statistics = self.aggregate(series, side, &samples);

        let latest = events.iter().enumerate().last();
        let current = match latest {
            Some((signal_id, event))
                if event.bar_index < len && !self.is_resolved(event.bar_index, len) =>
            {
                let elapsed = len - 1 - event.bar_index;
                Some(CurrentTrajectory {
                    signal_id,
                    timestamp: event.timestamp,
                    price: series.bars[event.bar_index].close,
                    current_period: elapsed,
                    samples: self.sample(series, side, signal_id, event, elapsed)?,
                })
            }
            _ => None,
        };

        let latest_bar = latest.and_then(|(_, e)| series.bars.get(e.bar_index));
        let means = statistics.iter().map(|s| s.mean);

        Ok(EvaluationReport {
            ticker: series.ticker.clone(),
            interval: series.interval,
            side,
            signal_count: events.len(),
            latest_signal: latest_bar.map(|b| b.timestamp),
            latest_signal_price: latest_bar.map(|b| b.close),
            current_time: last.map(|b| b.timestamp),
            current_price: last.map(|b| b.close),
            current_period: latest
                .filter(|(_, e)| e.bar_index < len)
                .map(|(_, e)| len - 1 - e.bar_index),
            samples,
            max_return: means.clone().reduce(f64::max),
            min_return: means.reduce(f64::min),
            statistics,
            current,
        })
    }

    fn sample(
        &self,
        series: &BarSeries,
        side: Side,
        signal_id: usize,
        event: &SignalEvent,
        through: usize,
    ) -> Result<Vec<ReturnSample>, ComputeError> {
        let bars = &series.bars;
        let base = &bars[event.bar_index];
        if !(base.close.is_finite() && base.close != 0.0) {
            return Err(ComputeError::ZeroBaselinePrice {
                timestamp: base.timestamp,
            });
        }
        let base_volume = base.volume as f64;

        Ok((0..=through)
            .filter_map(|offset| bars.get(event.bar_index + offset).map(|bar| (offset, bar)))
            .map(|(offset, bar)| ReturnSample {
                ticker: series.ticker.clone(),
                interval: series.interval,
                side,
                signal_id,
                period_offset: offset,
                return_pct: (bar.close - base.close) / base.close * 100.0,
                volume_ratio: (base_volume > 0.0).then(|| bar.volume as f64 / base_volume),
            })
            .collect())
    }

    fn aggregate(
        &self,
        series: &BarSeries,
        side: Side,
        samples: &[ReturnSample],
    ) -> Vec<PeriodStatistic> {
        (0..=self.horizon)
            .filter_map(|offset| {
                let (returns, ratios): (Vec<f64>, Vec<Option<f64>>) = samples
                    .iter()
                    .filter(|s| s.period_offset == offset)
                    .map(|s| (s.return_pct, s.volume_ratio))
                    .unzip();
                let summary = summarize(side, &returns, &ratios)?;
                Some(PeriodStatistic {
                    ticker: series.ticker.clone(),
                    interval: series.interval,
                    side,
                    period_offset: offset,
                    min: summary.min,
                    max: summary.max,
                    q1: summary.q1,
                    median: summary.median,
                    q3: summary.q3,
                    mean: summary.mean,
                    success_rate: summary.success_rate,
                    sample_count: summary.sample_count,
                    mean_volume_ratio: summary.mean_volume_ratio,
                })
            })
            .collect()
    }
}
