//! Criterion benchmarks for SignalScope hot paths.
//!
//! Benchmarks:
//! 1. Signal detection (CD and MC triggers over long series)
//! 2. Forward-return evaluation (samples + per-offset statistics)
//! 3. Indicator precompute (EMA, SMA, MACD)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use signalscope_core::components::indicator::{Field, Indicator};
use signalscope_core::components::{CdStrategy, DetectorConfig, McStrategy, SignalStrategy};
use signalscope_core::config::EngineConfig;
use signalscope_core::domain::{Bar, BarSeries, Interval, Side};
use signalscope_core::indicators::{Ema, Macd, Sma};
use signalscope_core::pipeline::evaluate_series;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_series(n: usize) -> BarSeries {
    let base = chrono::NaiveDate::from_ymd_opt(2020, 1, 2)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    let bars = (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0 + (i as f64 * 0.013).cos() * 4.0;
            Bar {
                timestamp: base + chrono::Duration::minutes(5 * i as i64),
                open: close - 0.3,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume: 1_000_000 + (i as u64 % 500_000),
            }
        })
        .collect();
    BarSeries::new("BENCH", Interval::M5, bars)
}

// ── 1. Detection ─────────────────────────────────────────────────────

fn bench_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("signal_detection");
    let config = DetectorConfig::default();

    for bar_count in [1_000, 5_000, 20_000] {
        let series = make_series(bar_count);
        group.bench_with_input(BenchmarkId::new("cd", bar_count), &bar_count, |b, _| {
            b.iter(|| CdStrategy.detect(black_box(&series), black_box(&config)))
        });
        group.bench_with_input(BenchmarkId::new("mc", bar_count), &bar_count, |b, _| {
            b.iter(|| McStrategy.detect(black_box(&series), black_box(&config)))
        });
    }

    group.finish();
}

// ── 2. Evaluation ────────────────────────────────────────────────────

fn bench_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("forward_return_evaluation");
    let series = make_series(5_000);
    let config = EngineConfig::default();
    let events = CdStrategy
        .detect(&series, &config.detector)
        .unwrap_or_default();
    let evaluator = config.evaluator();

    group.bench_function("evaluate_5000_bars", |b| {
        b.iter(|| evaluator.evaluate(black_box(&series), Side::Cd, black_box(&events)))
    });
    group.bench_function("pipeline_5000_bars", |b| {
        b.iter(|| evaluate_series(black_box(&series), &CdStrategy, black_box(&config)))
    });

    group.finish();
}

// ── 3. Indicator Precompute ──────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicator_precompute");
    let series = make_series(20_000);
    let indicators: Vec<Box<dyn Indicator>> = vec![
        Box::new(Ema::new(12)),
        Box::new(Sma::of(Field::Volume, 20)),
    ];

    for indicator in &indicators {
        group.bench_function(indicator.name(), |b| {
            b.iter(|| indicator.compute(black_box(&series.bars)))
        });
    }
    let closes: Vec<f64> = series.bars.iter().map(|b| b.close).collect();
    group.bench_function("macd_lines", |b| {
        b.iter(|| Macd::default().lines(black_box(&closes)))
    });

    group.finish();
}

criterion_group!(benches, bench_detection, bench_evaluation, bench_indicators);
criterion_main!(benches);
