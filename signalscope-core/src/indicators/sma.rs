//! Simple Moving Average (SMA).
//!
//! Rolling mean over a fixed window. Lookback: period - 1.

use crate::components::indicator::{Field, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    field: Field,
    name: String,
}

impl Sma {
    pub fn of(field: Field, period: usize) -> Self {
        let period = period.max(1);
        Self {
            period,
            field,
            name: format!("sma_{}_{period}", field.label()),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        sma_of_series(&self.field.extract(bars), self.period)
    }
}

/// Rolling mean; a window containing NaN yields NaN.
pub fn sma_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[i + 1 - period..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = window.iter().sum::<f64>() / period as f64;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn sma_3_known_values() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let result = Sma::of(Field::Close, 3).compute(&bars);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
        assert_approx(result[3], 12.0, DEFAULT_EPSILON);
        assert_approx(result[4], 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_of_volume() {
        let bars = make_bars(&[1.0, 2.0, 3.0]);
        let result = Sma::of(Field::Volume, 2).compute(&bars);
        assert_approx(result[2], 1000.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_nan_window_is_nan() {
        let result = sma_of_series(&[1.0, f64::NAN, 3.0, 4.0, 5.0], 2);
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        assert_approx(result[3], 3.5, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_lookback() {
        assert_eq!(Sma::of(Field::Volume, 20).lookback(), 19);
    }
}
