//! SignalScope Core: signal detection, forward-return evaluation, resonance,
//! market breadth and date-truncation backtesting.
//!
//! This crate is a pure engine with no I/O:
//! - Domain types (bars, series, intervals, sides, signal events)
//! - Indicators and pluggable signal trigger strategies (CD / MC)
//! - Forward-return distribution statistics ("Waikiki")
//! - Multi-interval confluence ("Resonance" 1234 / 5230)
//! - Daily breadth counts across a ticker universe
//! - Backtest truncation and derived-interval resampling

pub mod backtest;
pub mod breadth;
pub mod components;
pub mod config;
pub mod data;
pub mod detail;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod pipeline;
pub mod resonance;
pub mod waikiki;

pub use backtest::{BacktestController, LookbackConfig, LookbackWindow};
pub use breadth::{BreadthCount, MarketBreadthAggregator};
pub use components::{strategy_for, CdStrategy, DetectorConfig, McStrategy, SignalStrategy};
pub use config::EngineConfig;
pub use domain::{Bar, BarSeries, Interval, Side, SignalDetail, SignalEvent};
pub use error::{ComputeError, ConfigError, DataError, EvalError, ReasonCode};
pub use pipeline::{evaluate_series, SeriesEvaluation};
pub use resonance::{
    BreakoutCandidate, ResonanceConfig, ResonanceDetector, ResonanceOutcome, ResonanceTable,
    VariantSpec,
};
pub use waikiki::{
    CurrentTrajectory, EvaluationReport, ForwardReturnEvaluator, PeriodStatistic, ReturnSample,
};
