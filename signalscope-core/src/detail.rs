//! Per-event details: signal price, score and the follow-up channel breakthrough.
//!
//! score = weight(interval) * 0.5 + candle_pct * 0.3 + volume_ratio20 * 0.2,
//! rounded to two decimals.

use crate::components::{DetectorConfig, Field, Indicator};
use crate::domain::{BarSeries, SignalDetail, SignalEvent};
use crate::indicators::{breakthroughs, first_breakthrough_from, Sma};

/// Bars in the volume baseline of the score.
pub const SCORE_VOLUME_WINDOW: usize = 20;

/// Attach price, score and breakthrough to each event of `series`.
///
/// Events whose `bar_index` falls outside the series are skipped.
pub fn signal_details(
    series: &BarSeries,
    events: &[SignalEvent],
    config: &DetectorConfig,
) -> Vec<SignalDetail> {
    let flags = breakthroughs(&series.bars, config.channel_span);
    let baseline = volume_baseline(series);
    events
        .iter()
        .filter_map(|event| {
            let bar = series.bars.get(event.bar_index)?;
            let breakthrough = first_breakthrough_from(&flags, event.bar_index)
                .map(|i| series.bars[i].timestamp);
            Some(SignalDetail {
                event: event.clone(),
                signal_price: bar.close,
                score: score_with(series, &baseline, event.bar_index),
                breakthrough,
            })
        })
        .collect()
}

/// Score of the signal at `index`.
pub fn score(series: &BarSeries, index: usize) -> f64 {
    score_with(series, &volume_baseline(series), index)
}

fn volume_baseline(series: &BarSeries) -> Vec<f64> {
    Sma::of(Field::Volume, SCORE_VOLUME_WINDOW).compute(&series.bars)
}

fn score_with(series: &BarSeries, baseline: &[f64], index: usize) -> f64 {
    let Some(bar) = series.bars.get(index) else {
        return 0.0;
    };
    let candle_pct = if bar.close > 0.0 {
        (bar.close - bar.open).abs() / bar.close * 100.0
    } else {
        0.0
    };
    let raw = series.interval.score_weight() * 0.5
        + candle_pct * 0.3
        + volume_ratio(bar.volume, baseline.get(index).copied()) * 0.2;
    (raw * 100.0).round() / 100.0
}

/// Volume over its rolling mean; zero while the mean is warming up or zero.
fn volume_ratio(volume: u64, mean: Option<f64>) -> f64 {
    match mean {
        Some(mean) if mean > 0.0 => volume as f64 / mean,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Interval, Side};
    use crate::indicators::{assert_approx, make_bars};

    fn event(series: &BarSeries, index: usize) -> SignalEvent {
        SignalEvent {
            ticker: series.ticker.clone(),
            interval: series.interval,
            side: Side::Cd,
            timestamp: series.bars[index].timestamp,
            bar_index: index,
        }
    }

    #[test]
    fn score_combines_weight_candle_and_volume() {
        // Flat volume → ratio 1.0 from bar 19 on.
        // Bar 25: open 100, close 102 → candle 1.9608 %.
        let mut closes = vec![100.0; 25];
        closes.push(102.0);
        let series = BarSeries::new("AAA", Interval::D1, make_bars(&closes));
        let expected = 10.0 * 0.5 + (2.0 / 102.0 * 100.0) * 0.3 + 1.0 * 0.2;
        assert_approx(score(&series, 25), (expected * 100.0_f64).round() / 100.0, 1e-12);
    }

    #[test]
    fn early_bars_have_no_volume_component() {
        let series = BarSeries::new("AAA", Interval::H1, make_bars(&[50.0; 10]));
        assert_approx(score(&series, 5), 3.0, 1e-12);
    }

    #[test]
    fn volume_spike_raises_score() {
        let mut bars = make_bars(&[100.0; 30]);
        bars[25].volume = 3000;
        let series = BarSeries::new("AAA", Interval::D1, bars);
        // mean over bars 6..=25 = (19 * 1000 + 3000) / 20 = 1100
        let expected = 10.0 * 0.5 + (3000.0 / 1100.0) * 0.2;
        assert_approx(score(&series, 25), (expected * 100.0_f64).round() / 100.0, 1e-12);
        assert_approx(score(&series, 24), 5.2, 1e-12);
    }

    #[test]
    fn details_find_breakthrough_after_event() {
        let mut closes = vec![100.0; 30];
        closes.extend([105.0, 106.0]);
        let series = BarSeries::new("AAA", Interval::D1, make_bars(&closes));
        let events = vec![event(&series, 10), event(&series, 31)];
        let details = signal_details(&series, &events, &DetectorConfig::default());
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].signal_price, 100.0);
        assert_eq!(details[0].breakthrough, Some(series.bars[30].timestamp));
        assert_eq!(details[1].breakthrough, None);
    }
}
