//! Concrete indicator implementations.
//!
//! EMA and SMA implement the `Indicator` trait from `components::indicator`;
//! MACD hands its three lines to the divergence triggers, which also need the
//! per-bar window helpers and the channel breakthrough.

pub mod channel;
pub mod ema;
pub mod macd;
pub mod sma;
pub mod window;

pub use channel::{breakthroughs, first_breakthrough_from};
pub use ema::{ema_of_series, Ema};
pub use macd::{Macd, MacdLines};
pub use sma::{sma_of_series, Sma};
pub use window::{bars_since, cross_above_zero, cross_below_zero, highest_over, lagged, lowest_over};

/// Create synthetic daily bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
