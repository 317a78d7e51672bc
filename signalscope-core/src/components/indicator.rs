//! Indicator trait and the bar fields indicators read from.
//!
//! Indicators are pure functions: bar history in, numeric series out. Values
//! that cannot be computed yet are `f64::NAN`.

use crate::domain::Bar;

/// Bar field an indicator is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Close => "close",
            Self::Volume => "volume",
        }
    }

    pub fn extract(&self, bars: &[Bar]) -> Vec<f64> {
        bars.iter()
            .map(|b| match self {
                Self::Open => b.open,
                Self::High => b.high,
                Self::Low => b.low,
                Self::Close => b.close,
                Self::Volume => b.volume as f64,
            })
            .collect()
    }
}

/// Trait for indicators.
///
/// Indicators take a full bar series and produce a numeric output series of
/// the same length. The first `lookback()` values are `f64::NAN` (warmup).
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
/// Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_close_12", "sma_volume_20").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}
