//! Run configuration: the engine config plus orchestration settings.
//!
//! ```toml
//! [engine]
//! horizon = 100
//!
//! [run]
//! sides = ["CD", "MC"]
//! parallel = true
//! end_date = "2024-06-28"
//!
//! [run.source]
//! kind = "csv"
//! root = "data"
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use signalscope_core::config::EngineConfig;
use signalscope_core::domain::Side;
use signalscope_core::error::ConfigError;

/// Where bars come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataSource {
    /// `<root>/<TICKER>/<interval>.csv`
    Csv { root: PathBuf },
    /// Seeded random walks of `sessions` weekdays from `start`.
    Synthetic { start: NaiveDate, sessions: usize },
}

impl Default for DataSource {
    fn default() -> Self {
        Self::Synthetic {
            start: NaiveDate::from_ymd_opt(2022, 1, 3).unwrap_or(NaiveDate::MIN),
            sessions: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub sides: Vec<Side>,
    /// Fan out over rayon; sequential mode produces identical output.
    pub parallel: bool,
    /// Thread cap for the rayon pool; `None` uses the global pool.
    pub threads: Option<usize>,
    /// Inclusive backtest cutoff; `None` evaluates through the newest bar.
    pub end_date: Option<NaiveDate>,
    pub retry_attempts: u32,
    pub retry_base_ms: u64,
    pub source: DataSource,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            sides: Side::ALL.to_vec(),
            parallel: true,
            threads: None,
            end_date: None,
            retry_attempts: 3,
            retry_base_ms: 250,
            source: DataSource::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub engine: EngineConfig,
    pub run: RunSettings,
}

impl RunConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        if self.run.sides.is_empty() {
            return Err(ConfigError::invalid("run.sides", "at least one side is required"));
        }
        if self.run.threads == Some(0) {
            return Err(ConfigError::invalid("run.threads", "must be > 0"));
        }
        if self.run.retry_attempts == 0 {
            return Err(ConfigError::invalid("run.retry_attempts", "must be > 0"));
        }
        if let DataSource::Synthetic { sessions: 0, .. } = self.run.source {
            return Err(ConfigError::invalid("run.source.sessions", "must be > 0"));
        }
        Ok(())
    }

    /// Deterministic content hash of the configuration.
    pub fn run_id(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use signalscope_core::domain::Interval;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(RunConfig::from_toml("").unwrap(), RunConfig::default());
    }

    #[test]
    fn sections_parse() {
        let config = RunConfig::from_toml(
            r#"
            [engine]
            horizon = 20
            intervals = ["1d"]

            [run]
            sides = ["MC"]
            parallel = false
            threads = 2
            end_date = "2024-06-28"

            [run.source]
            kind = "csv"
            root = "bars"
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.horizon, 20);
        assert_eq!(config.engine.intervals, vec![Interval::D1]);
        assert_eq!(config.run.sides, vec![Side::Mc]);
        assert!(!config.run.parallel);
        assert_eq!(config.run.threads, Some(2));
        assert_eq!(config.run.end_date, NaiveDate::from_ymd_opt(2024, 6, 28));
        assert_eq!(config.run.retry_attempts, 3);
        assert_eq!(
            config.run.source,
            DataSource::Csv {
                root: PathBuf::from("bars")
            }
        );
    }

    #[test]
    fn validation_rejects_bad_settings() {
        assert!(RunConfig::from_toml("[run]\nsides = []").is_err());
        assert!(RunConfig::from_toml("[run]\nthreads = 0").is_err());
        assert!(RunConfig::from_toml("[run]\nretry_attempts = 0").is_err());
        assert!(RunConfig::from_toml("[engine]\nhorizon = 0").is_err());
        assert!(RunConfig::from_toml(
            "[run.source]\nkind = \"synthetic\"\nstart = \"2024-01-01\"\nsessions = 0"
        )
        .is_err());
    }

    #[test]
    fn run_id_is_deterministic() {
        let a = RunConfig::default();
        let mut b = RunConfig::default();
        assert_eq!(a.run_id().unwrap(), b.run_id().unwrap());
        b.engine.horizon = 50;
        assert_ne!(a.run_id().unwrap(), b.run_id().unwrap());
        assert_eq!(a.run_id().unwrap().len(), 64);
    }
}
