//! Resampling of derived intervals from their native source bars.
//!
//! Intraday buckets chunk consecutive source bars within one calendar day,
//! starting at the first bar of each session. Weekly buckets group daily bars
//! by ISO week. A bucket takes the last constituent's timestamp, the first open,
//! the extreme high and low, the last close and the summed volume. A trailing
//! partial bucket is kept, so resampling a truncated series never reads bars
//! past the cut.

use chrono::Datelike;

use crate::domain::{Bar, BarSeries, Derivation, Interval};
use crate::error::ConfigError;

/// Build `target` bars from the bars of its source interval.
pub fn resample_bars(source: &[Bar], derivation: Derivation) -> Vec<Bar> {
    match derivation {
        Derivation::Chunk { factor, .. } => chunk_by_session(source, factor.max(1)),
        Derivation::IsoWeek { .. } => group_by_iso_week(source),
    }
}

/// Resample a whole series into `target`.
///
/// Fails with `ConfigError::Invalid` when `target` is not derived from the
/// series' interval.
pub fn resample_series(source: &BarSeries, target: Interval) -> Result<BarSeries, ConfigError> {
    let derivation = target.derivation().ok_or_else(|| {
        ConfigError::invalid("interval", format!("{target} is a native interval"))
    })?;
    let expected = match derivation {
        Derivation::Chunk { source, .. } | Derivation::IsoWeek { source } => source,
    };
    if expected != source.interval {
        return Err(ConfigError::invalid(
            "interval",
            format!(
                "{target} resamples from {expected}, got {} bars",
                source.interval
            ),
        ));
    }
    Ok(BarSeries::new(
        source.ticker.clone(),
        target,
        resample_bars(&source.bars, derivation),
    ))
}

fn chunk_by_session(source: &[Bar], factor: usize) -> Vec<Bar> {
    let mut out = Vec::with_capacity(source.len() / factor + 1);
    let mut start = 0;
    while start < source.len() {
        let day = source[start].date();
        let mut end = start;
        while end < source.len() && source[end].date() == day {
            end += 1;
        }
        for chunk in source[start..end].chunks(factor) {
            if let Some(bar) = merge(chunk) {
                out.push(bar);
            }
        }
        start = end;
    }
    out
}

fn group_by_iso_week(source: &[Bar]) -> Vec<Bar> {
    let mut out = Vec::with_capacity(source.len() / 5 + 1);
    let mut start = 0;
    while start < source.len() {
        let week = source[start].date().iso_week();
        let mut end = start;
        while end < source.len() && source[end].date().iso_week() == week {
            end += 1;
        }
        if let Some(bar) = merge(&source[start..end]) {
            out.push(bar);
        }
        start = end;
    }
    out
}

fn merge(chunk: &[Bar]) -> Option<Bar> {
    let first = chunk.first()?;
    let last = chunk.last()?;
    let high = chunk.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let low = chunk.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    Some(Bar {
        timestamp: last.timestamp,
        open: first.open,
        high,
        low,
        close: last.close,
        volume: chunk.iter().map(|b| b.volume).sum(),
    })
}
