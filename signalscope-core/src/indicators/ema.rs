//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (span + 1).
//! Seed: EMA[0] = x[0], so there is no warmup.

use crate::components::indicator::{Field, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    field: Field,
    name: String,
}

impl Ema {
    /// EMA of close prices.
    pub fn new(span: usize) -> Self {
        Self::of(Field::Close, span)
    }

    pub fn of(field: Field, span: usize) -> Self {
        let span = span.max(1);
        Self {
            span,
            field,
            name: format!("ema_{}_{span}", field.label()),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        ema_of_series(&self.field.extract(bars), self.span)
    }
}

/// Compute raw EMA values from a pre-extracted f64 slice.
///
/// A NaN input taints its own position and every later one.
pub fn ema_of_series(values: &[f64], span: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if n == 0 {
        return result;
    }

    let alpha = 2.0 / (span.max(1) as f64 + 1.0);
    let mut prev = values[0];
    if prev.is_nan() {
        return result;
    }
    result[0] = prev;

    for i in 1..n {
        if values[i].is_nan() {
            return result;
        }
        let ema = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = ema;
        prev = ema;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn ema_span_1_equals_close() {
        let bars = make_bars(&[100.0, 200.0, 300.0]);
        let result = Ema::new(1).compute(&bars);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[1], 200.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 0.5, seeded with the first value
        // 10 → 10, 12 → 11, 14 → 12.5, 10 → 11.25
        let bars = make_bars(&[10.0, 12.0, 14.0, 10.0]);
        let result = Ema::new(3).compute(&bars);
        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        assert_approx(result[1], 11.0, DEFAULT_EPSILON);
        assert_approx(result[2], 12.5, DEFAULT_EPSILON);
        assert_approx(result[3], 11.25, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_of_high_reads_high() {
        let bars = make_bars(&[10.0, 10.0]);
        let result = Ema::of(Field::High, 24).compute(&bars);
        assert_approx(result[1], 11.0, DEFAULT_EPSILON);
        assert_eq!(Ema::of(Field::High, 24).name(), "ema_high_24");
    }

    #[test]
    fn ema_nan_propagates() {
        let values = [10.0, 11.0, f64::NAN, 13.0];
        let result = ema_of_series(&values, 3);
        assert!(!result[1].is_nan());
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
    }

    #[test]
    fn ema_empty_input() {
        assert!(ema_of_series(&[], 12).is_empty());
    }
}
