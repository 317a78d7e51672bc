//! Signal detection: pluggable trigger strategies over a bar series.
//!
//! A strategy only decides on which bars its trigger fires. Validation, the
//! minimum-bars guard and the mapping to [`SignalEvent`]s are shared, so every
//! strategy sees the same guarantees: identical bars give identical events, and
//! a flag at bar `i` depends on `bars[0..=i]` only.

pub mod cd;
pub mod divergence;
pub mod mc;

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, BarSeries, Side, SignalEvent};
use crate::error::{ConfigError, DataError};

pub use cd::CdStrategy;
pub use divergence::{divergence_flags, Polarity};
pub use mc::McStrategy;

/// Parameters shared by the divergence triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub fast_span: usize,
    pub slow_span: usize,
    pub signal_span: usize,
    /// `|diff[i-1]|` must exceed `|diff[i]|` by this factor for momentum to turn.
    pub shrink_factor: f64,
    /// Span of the EMA of highs used as the upper channel.
    pub channel_span: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            fast_span: 12,
            slow_span: 26,
            signal_span: 9,
            shrink_factor: 1.01,
            channel_span: 24,
        }
    }
}

impl DetectorConfig {
    /// Longest indicator lookback: the slow EMA plus the signal line.
    pub fn min_bars(&self) -> usize {
        self.slow_span + self.signal_span
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fast_span == 0 || self.slow_span == 0 || self.signal_span == 0 {
            return Err(ConfigError::invalid("detector", "spans must be > 0"));
        }
        if self.fast_span >= self.slow_span {
            return Err(ConfigError::invalid(
                "detector.fast_span",
                format!(
                    "fast span {} must be below slow span {}",
                    self.fast_span, self.slow_span
                ),
            ));
        }
        if !self.shrink_factor.is_finite() || self.shrink_factor <= 0.0 {
            return Err(ConfigError::invalid(
                "detector.shrink_factor",
                "must be a positive finite number",
            ));
        }
        if self.channel_span == 0 {
            return Err(ConfigError::invalid("detector.channel_span", "must be > 0"));
        }
        Ok(())
    }
}

/// Trait for trigger strategies.
///
/// # Architecture invariant
/// `trigger` must be causal: `flags[i]` may only read `bars[0..=i]`. The
/// prefix and truncation tests enforce this for every shipped strategy.
pub trait SignalStrategy: Send + Sync {
    /// Human-readable name (e.g., "cd_divergence").
    fn name(&self) -> &str;

    /// Side every event of this strategy carries.
    fn side(&self) -> Side;

    /// Fewest bars the trigger needs.
    fn min_bars(&self, config: &DetectorConfig) -> usize {
        config.min_bars()
    }

    /// Per-bar trigger flags, the same length as `bars`.
    fn trigger(&self, bars: &[Bar], config: &DetectorConfig) -> Vec<bool>;

    /// Validate the series and map the trigger flags to events.
    fn detect(
        &self,
        series: &BarSeries,
        config: &DetectorConfig,
    ) -> Result<Vec<SignalEvent>, DataError> {
        series.validate()?;
        let required = self.min_bars(config);
        if series.len() < required {
            return Err(DataError::InsufficientData {
                required,
                available: series.len(),
            });
        }

        let flags = self.trigger(&series.bars, config);
        Ok(flags
            .iter()
            .zip(&series.bars)
            .enumerate()
            .filter(|(_, (&fired, _))| fired)
            .map(|(bar_index, (_, bar))| SignalEvent {
                ticker: series.ticker.clone(),
                interval: series.interval,
                side: self.side(),
                timestamp: bar.timestamp,
                bar_index,
            })
            .collect())
    }
}

/// Shipped strategy for a side.
pub fn strategy_for(side: Side) -> Box<dyn SignalStrategy> {
    match side {
        Side::Cd => Box::new(CdStrategy),
        Side::Mc => Box::new(McStrategy),
    }
}
