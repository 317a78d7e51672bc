//! Resonance and breadth over detected signals for a small universe.

use chrono::{NaiveDate, NaiveDateTime};
use signalscope_core::breadth::MarketBreadthAggregator;
use signalscope_core::domain::{Bar, BarSeries, Interval, Side, SignalDetail, SignalEvent};
use signalscope_core::resonance::{trend_alignment, ResonanceConfig, ResonanceDetector};

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn detail(
    ticker: &str,
    interval: Interval,
    side: Side,
    ts: NaiveDateTime,
    price: f64,
) -> SignalDetail {
    SignalDetail {
        event: SignalEvent {
            ticker: ticker.into(),
            interval,
            side,
            timestamp: ts,
            bar_index: 0,
        },
        signal_price: price,
        score: 0.0,
        breakthrough: None,
    }
}

fn daily_trend(closes: impl Iterator<Item = f64>) -> BarSeries {
    let base = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
    let bars = closes
        .enumerate()
        .map(|(i, close)| Bar {
            timestamp: (base + chrono::Duration::days(i as i64))
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1,
        })
        .collect();
    BarSeries::new("AAA", Interval::D1, bars)
}

fn four_hour_signals(ticker: &str, side: Side, day: u32) -> Vec<SignalDetail> {
    [Interval::H1, Interval::H2, Interval::H3, Interval::H4]
        .iter()
        .enumerate()
        .map(|(k, &i)| detail(ticker, i, side, at(day, 10 + k as u32), 20.0 + k as f64))
        .collect()
}

#[test]
fn all_four_same_day_fires_and_removing_one_suppresses() {
    let config = ResonanceConfig::default();
    let detector = ResonanceDetector::new(&config);

    let signals = four_hour_signals("AAA", Side::Cd, 10);
    let outcome = detector
        .detect("1234", "AAA", Side::Cd, &signals, None)
        .unwrap();
    let candidate = outcome.candidate.expect("candidate fires");
    assert_eq!(
        candidate.matched_intervals,
        vec![Interval::H1, Interval::H2, Interval::H3, Interval::H4]
    );
    assert_eq!(candidate.signal_price, 23.0);

    let outcome = detector
        .detect("1234", "AAA", Side::Cd, &signals[..3], None)
        .unwrap();
    assert!(outcome.candidate.is_none());
    assert_eq!(outcome.missing, vec![Interval::H4]);
}

#[test]
fn mixed_sides_never_form_a_candidate() {
    let config = ResonanceConfig::default();
    let mut signals = four_hour_signals("AAA", Side::Cd, 10);
    signals[2].event.side = Side::Mc;
    for side in Side::ALL {
        let outcome = ResonanceDetector::new(&config)
            .detect("1234", "AAA", side, &signals, None)
            .unwrap();
        assert!(outcome.candidate.is_none());
    }
}

#[test]
fn trend_alignment_is_informational() {
    let config = ResonanceConfig::default();
    let signals = four_hour_signals("AAA", Side::Mc, 10);
    // Steady uptrend: fast EMA above slow, which disagrees with MC.
    let trend = daily_trend((0..300).map(|i| 50.0 + i as f64 * 0.2));
    let outcome = ResonanceDetector::new(&config)
        .detect("1234", "AAA", Side::Mc, &signals, Some(&trend))
        .unwrap();
    let candidate = outcome.candidate.expect("trend never suppresses");
    assert_eq!(candidate.trend_aligned, Some(false));

    let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    assert_eq!(trend_alignment(&trend, Side::Cd, date), Some(true));
    let before = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    assert_eq!(trend_alignment(&trend, Side::Cd, before), None);
}

#[test]
fn breadth_counts_tickers_per_day() {
    let config = ResonanceConfig::default();
    let events: Vec<SignalEvent> = [
        ("AAA", Interval::H1, at(5, 10)),
        ("BBB", Interval::H1, at(5, 11)),
        ("BBB", Interval::H3, at(5, 14)),
        ("CCC", Interval::H4, at(5, 15)),
        ("DDD", Interval::H2, at(6, 10)),
    ]
    .into_iter()
    .map(|(t, i, ts)| SignalEvent {
        ticker: t.into(),
        interval: i,
        side: Side::Cd,
        timestamp: ts,
        bar_index: 0,
    })
    .collect();

    let counts = MarketBreadthAggregator::new(&config.variants)
        .aggregate("1234", Side::Cd, &events)
        .unwrap();
    let got: Vec<(String, usize)> = counts
        .iter()
        .map(|c| (c.date.to_string(), c.count))
        .collect();
    assert_eq!(
        got,
        vec![("2024-01-05".to_string(), 3), ("2024-01-06".to_string(), 1)]
    );
}
