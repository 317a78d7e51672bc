//! Error taxonomy for the evaluation engine.
//!
//! Three concerns, one enum each: bad input data, bad configuration, and guarded
//! arithmetic. `EvalError` unifies them for per-series pipelines so the runner can
//! report a skipped entry with a stable [`ReasonCode`] instead of aborting.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Problems with the bar series itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("insufficient data: {required} bars required, {available} available")]
    InsufficientData { required: usize, available: usize },

    #[error("timestamps are not increasing at bar {index}: {previous} then {current}")]
    NonMonotonic {
        index: usize,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },

    #[error("duplicate timestamp {timestamp} at bar {index}")]
    DuplicateTimestamp {
        index: usize,
        timestamp: NaiveDateTime,
    },

    #[error("non-finite price at bar {index} ({timestamp})")]
    VoidBar {
        index: usize,
        timestamp: NaiveDateTime,
    },
}

/// Problems with the engine configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown interval '{0}' (expected one of 5m, 10m, 15m, 30m, 1h, 2h, 3h, 4h, 1d, 1w)")]
    UnknownInterval(String),

    #[error("unknown resonance variant '{0}'")]
    UnknownVariant(String),

    #[error("invalid config field '{field}': {reason}")]
    Invalid { field: String, reason: String },

    #[error("config parse error: {0}")]
    Parse(String),

    #[error("config I/O error: {0}")]
    Io(String),
}

impl ConfigError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Guarded divisions that would otherwise produce infinities.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComputeError {
    #[error("zero or non-finite baseline price at signal bar {timestamp}")]
    ZeroBaselinePrice { timestamp: NaiveDateTime },
}

/// Any failure of a single (ticker, interval) pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Compute(#[from] ComputeError),
}

/// Stable, machine-readable reason attached to skipped entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    InsufficientData,
    NonMonotonic,
    DuplicateTimestamp,
    VoidBar,
    UnknownInterval,
    UnknownVariant,
    InvalidConfig,
    ZeroBaseline,
    Provider,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientData => "insufficient_data",
            Self::NonMonotonic => "non_monotonic",
            Self::DuplicateTimestamp => "duplicate_timestamp",
            Self::VoidBar => "void_bar",
            Self::UnknownInterval => "unknown_interval",
            Self::UnknownVariant => "unknown_variant",
            Self::InvalidConfig => "invalid_config",
            Self::ZeroBaseline => "zero_baseline",
            Self::Provider => "provider",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EvalError {
    pub fn reason_code(&self) -> ReasonCode {
        match self {
            Self::Data(DataError::InsufficientData { .. }) => ReasonCode::InsufficientData,
            Self::Data(DataError::NonMonotonic { .. }) => ReasonCode::NonMonotonic,
            Self::Data(DataError::DuplicateTimestamp { .. }) => ReasonCode::DuplicateTimestamp,
            Self::Data(DataError::VoidBar { .. }) => ReasonCode::VoidBar,
            Self::Config(ConfigError::UnknownInterval(_)) => ReasonCode::UnknownInterval,
            Self::Config(ConfigError::UnknownVariant(_)) => ReasonCode::UnknownVariant,
            Self::Config(_) => ReasonCode::InvalidConfig,
            Self::Compute(ComputeError::ZeroBaselinePrice { .. }) => ReasonCode::ZeroBaseline,
        }
    }
}
