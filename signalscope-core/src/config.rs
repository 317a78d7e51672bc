//! Engine configuration, loaded from TOML with every field defaulted.
//!
//! Nothing here is global: the config is passed to each stage explicitly.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::backtest::LookbackConfig;
use crate::components::DetectorConfig;
use crate::domain::Interval;
use crate::error::ConfigError;
use crate::resonance::ResonanceConfig;
use crate::waikiki::ForwardReturnEvaluator;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Only the most recent N resolved signals feed the statistics.
    pub max_signals_threshold: usize,
    /// Forward offsets are evaluated for `0..=horizon`.
    pub horizon: usize,
    pub intervals: Vec<Interval>,
    pub detector: DetectorConfig,
    pub lookback: LookbackConfig,
    pub resonance: ResonanceConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_signals_threshold: 10,
            horizon: 100,
            intervals: Interval::ALL.to_vec(),
            detector: DetectorConfig::default(),
            lookback: LookbackConfig::default(),
            resonance: ResonanceConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse from a TOML string and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file and validate.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizon == 0 {
            return Err(ConfigError::invalid("horizon", "must be > 0"));
        }
        if self.max_signals_threshold == 0 {
            return Err(ConfigError::invalid("max_signals_threshold", "must be > 0"));
        }
        if self.intervals.is_empty() {
            return Err(ConfigError::invalid("intervals", "at least one interval is required"));
        }
        self.detector.validate()?;
        self.lookback.validate()?;
        self.resonance.validate()
    }

    pub fn evaluator(&self) -> ForwardReturnEvaluator {
        ForwardReturnEvaluator::new(self.horizon, self.max_signals_threshold)
    }

    /// Evaluated intervals plus everything resonance needs, finest first.
    pub fn all_intervals(&self) -> Vec<Interval> {
        let mut all = self.intervals.clone();
        all.extend(self.resonance.variants.required_intervals());
        all.sort();
        all.dedup();
        all
    }
}
