//! Distribution statistics over forward-return samples.

use serde::{Deserialize, Serialize};

use crate::domain::{Interval, Side};

/// Linear-interpolated percentile of an ascending slice: `rank = p * (n - 1)`.
///
/// Returns NaN for an empty slice.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = p.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * weight
        }
    }
}

/// Aggregates for one forward offset over the resolved signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodStatistic {
    pub ticker: String,
    pub interval: Interval,
    pub side: Side,
    pub period_offset: usize,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub mean: f64,
    /// Fraction of samples moving in the side's favour, in [0, 1].
    pub success_rate: f64,
    pub sample_count: usize,
    pub mean_volume_ratio: Option<f64>,
}

/// Summary of one offset's samples, before it is labelled with its series.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub mean: f64,
    pub success_rate: f64,
    pub sample_count: usize,
    pub mean_volume_ratio: Option<f64>,
}

/// Summarize returns and volume ratios, dropping NaN and missing values first.
///
/// `None` when no finite return remains.
pub fn summarize(side: Side, returns: &[f64], volume_ratios: &[Option<f64>]) -> Option<Summary> {
    let mut sorted: Vec<f64> = returns.iter().copied().filter(|r| r.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let successes = sorted.iter().filter(|&&r| side.is_success(r)).count();

    let ratios: Vec<f64> = volume_ratios
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    let mean_volume_ratio = if ratios.is_empty() {
        None
    } else {
        Some(ratios.iter().sum::<f64>() / ratios.len() as f64)
    };

    Some(Summary {
        min: sorted[0],
        max: sorted[n - 1],
        q1: percentile(&sorted, 0.25),
        median: percentile(&sorted, 0.5),
        q3: percentile(&sorted, 0.75),
        mean,
        success_rate: successes as f64 / n as f64,
        sample_count: n,
        mean_volume_ratio,
    })
}
