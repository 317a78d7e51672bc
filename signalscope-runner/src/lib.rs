//! SignalScope Runner: universe evaluation on top of `signalscope-core`.
//!
//! This crate provides:
//! - Market data providers (CSV directory, in-memory, synthetic) with
//!   resampling of derived intervals and retry on transient failures
//! - Universe loading from ticker lists or sector TOML
//! - Parallel fan-out over tickers and (interval, side) with cancellation
//! - Output record sets and best-interval selection
//! - Run fingerprinting over config and data

pub mod config;
pub mod fingerprint;
pub mod provider;
pub mod report;
pub mod runner;
pub mod selection;
pub mod universe;

pub use config::{DataSource, RunConfig, RunSettings};
pub use fingerprint::RunFingerprint;
pub use provider::{
    CsvDirectoryProvider, InMemoryProvider, MarketDataProvider, ProviderError, ResamplingProvider,
    RetryingProvider, SyntheticProvider,
};
pub use report::{
    evaluations_csv, BestIntervalTable, BreadthRow, BreadthTable, BreakoutRow, DistributionRow,
    EvaluationRow, ExportError, RecordSets, SignalDetailRow,
};
pub use runner::{CancelToken, EngineOutput, RunError, Runner, SkippedEntry, StrategySet};
pub use selection::{BestIntervalRow, PeriodRange, SelectionConfig};
pub use universe::{Universe, UniverseError};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn providers_are_send_sync() {
        assert_send::<CsvDirectoryProvider>();
        assert_sync::<CsvDirectoryProvider>();
        assert_send::<RetryingProvider<ResamplingProvider<SyntheticProvider>>>();
        assert_sync::<RetryingProvider<ResamplingProvider<SyntheticProvider>>>();
        assert_send::<Box<dyn MarketDataProvider>>();
        assert_sync::<Box<dyn MarketDataProvider>>();
    }

    #[test]
    fn run_types_are_send_sync() {
        assert_send::<Runner<InMemoryProvider>>();
        assert_sync::<Runner<InMemoryProvider>>();
        assert_send::<EngineOutput>();
        assert_sync::<EngineOutput>();
        assert_send::<CancelToken>();
        assert_sync::<CancelToken>();
    }

    #[test]
    fn output_rows_are_send_sync() {
        assert_send::<RecordSets>();
        assert_sync::<RecordSets>();
        assert_send::<BestIntervalRow>();
        assert_sync::<BestIntervalRow>();
    }
}
