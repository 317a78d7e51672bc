//! Universe evaluation.
//!
//! One task per ticker fetches and truncates its intervals, then one task per
//! (interval, side) runs detection and forward-return evaluation. The ticker
//! join feeds resonance; the global join feeds market breadth. Failures on a
//! single (ticker, interval) become [`SkippedEntry`] records and never abort
//! the run.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use signalscope_core::backtest::BacktestController;
use signalscope_core::breadth::{BreadthCount, MarketBreadthAggregator};
use signalscope_core::components::{strategy_for, SignalStrategy};
use signalscope_core::domain::{BarSeries, Interval, Side, SignalDetail, SignalEvent};
use signalscope_core::error::{ConfigError, ReasonCode};
use signalscope_core::pipeline::evaluate_series;
use signalscope_core::resonance::{BreakoutCandidate, ResonanceDetector, ResonanceOutcome};
use signalscope_core::waikiki::EvaluationReport;

use crate::config::RunConfig;
use crate::fingerprint::{dataset_hash, series_digest, RunFingerprint};
use crate::provider::MarketDataProvider;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("universe is empty")]
    EmptyUniverse,
    #[error("run cancelled")]
    Cancelled,
    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),
}

/// Shared cooperative cancellation flag, checked at task boundaries.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A (ticker, interval[, side]) that produced no evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub ticker: String,
    pub interval: Option<Interval>,
    pub side: Option<Side>,
    pub reason: ReasonCode,
    pub message: String,
}

/// Signal strategies by side.
pub struct StrategySet {
    strategies: BTreeMap<Side, Box<dyn SignalStrategy>>,
}

impl StrategySet {
    pub fn empty() -> Self {
        Self {
            strategies: BTreeMap::new(),
        }
    }

    /// The built-in strategy for each of `sides`.
    pub fn for_sides(sides: &[Side]) -> Self {
        sides
            .iter()
            .fold(Self::empty(), |set, &side| set.with(strategy_for(side)))
    }

    /// Add `strategy`, replacing any strategy for the same side.
    pub fn with(mut self, strategy: Box<dyn SignalStrategy>) -> Self {
        self.strategies.insert(strategy.side(), strategy);
        self
    }

    pub fn get(&self, side: Side) -> Option<&dyn SignalStrategy> {
        self.strategies.get(&side).map(|s| s.as_ref())
    }

    pub fn sides(&self) -> Vec<Side> {
        self.strategies.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn SignalStrategy> {
        self.strategies.values().map(|s| s.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

/// Everything one run produces, sorted by (ticker, interval, side).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineOutput {
    pub fingerprint: RunFingerprint,
    pub end_date: Option<NaiveDate>,
    pub synthetic: bool,
    pub reports: Vec<EvaluationReport>,
    pub details: Vec<SignalDetail>,
    pub resonance: Vec<ResonanceOutcome>,
    /// Sorted by (variant, side, date).
    pub breadth: Vec<BreadthCount>,
    pub skipped: Vec<SkippedEntry>,
}

impl EngineOutput {
    pub fn candidates(&self) -> impl Iterator<Item = &BreakoutCandidate> {
        self.resonance.iter().filter_map(|o| o.candidate.as_ref())
    }

    pub fn reports_for(&self, side: Side) -> impl Iterator<Item = &EvaluationReport> {
        self.reports.iter().filter(move |r| r.side == side)
    }
}

struct TickerOutput {
    ticker: String,
    digest: blake3::Hash,
    reports: Vec<EvaluationReport>,
    details: Vec<SignalDetail>,
    events: Vec<SignalEvent>,
    resonance: Vec<ResonanceOutcome>,
    skipped: Vec<SkippedEntry>,
}

pub struct Runner<P> {
    provider: P,
    config: RunConfig,
    strategies: StrategySet,
}

impl<P: MarketDataProvider> Runner<P> {
    /// Validate `config` and use the built-in strategies for its sides.
    pub fn new(provider: P, config: RunConfig) -> Result<Self, RunError> {
        config.validate()?;
        let strategies = StrategySet::for_sides(&config.run.sides);
        Ok(Self {
            provider,
            config,
            strategies,
        })
    }

    pub fn with_strategies(mut self, strategies: StrategySet) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Evaluate `tickers`. Duplicates are evaluated once.
    pub fn run(
        &self,
        tickers: &[String],
        cancel: Option<&CancelToken>,
    ) -> Result<EngineOutput, RunError> {
        let mut tickers = tickers.to_vec();
        tickers.sort();
        tickers.dedup();
        if tickers.is_empty() {
            return Err(RunError::EmptyUniverse);
        }

        match self.config.run.threads {
            Some(threads) if self.config.run.parallel => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| RunError::ThreadPool(e.to_string()))?;
                pool.install(|| self.run_all(&tickers, cancel))
            }
            _ => self.run_all(&tickers, cancel),
        }
    }

    fn run_all(
        &self,
        tickers: &[String],
        cancel: Option<&CancelToken>,
    ) -> Result<EngineOutput, RunError> {
        let engine = &self.config.engine;
        let end_date = self.config.run.end_date;
        let parallel = self.config.run.parallel;
        let fetch_intervals = engine.all_intervals();
        let controller = BacktestController::new(end_date, &engine.lookback);

        info!(
            tickers = tickers.len(),
            intervals = ?engine.intervals,
            ?end_date,
            provider = self.provider.name(),
            parallel,
            "evaluation run started"
        );

        let outputs = fan_out(parallel, tickers, |ticker| {
            self.evaluate_ticker(ticker, &fetch_intervals, &controller, cancel)
        })
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

        if is_cancelled(cancel) {
            return Err(RunError::Cancelled);
        }

        let config_hash = self.config.run_id()?;
        let data_hash = dataset_hash(outputs.iter().map(|o| (o.ticker.as_str(), &o.digest)));

        let mut reports = Vec::new();
        let mut details = Vec::new();
        let mut events = Vec::new();
        let mut resonance = Vec::new();
        let mut skipped = Vec::new();
        for out in outputs {
            reports.extend(out.reports);
            details.extend(out.details);
            events.extend(out.events);
            resonance.extend(out.resonance);
            skipped.extend(out.skipped);
        }
        reports.sort_by(|a, b| {
            (&a.ticker, a.interval, a.side).cmp(&(&b.ticker, b.interval, b.side))
        });
        details.sort_by(|a, b| {
            (&a.event.ticker, a.event.interval, a.event.side, a.event.timestamp).cmp(&(
                &b.event.ticker,
                b.event.interval,
                b.event.side,
                b.event.timestamp,
            ))
        });
        resonance.sort_by(|a, b| {
            (&a.ticker, &a.variant, a.side).cmp(&(&b.ticker, &b.variant, b.side))
        });
        skipped.sort_by(|a, b| {
            (&a.ticker, a.interval, a.side).cmp(&(&b.ticker, b.interval, b.side))
        });

        let aggregator = MarketBreadthAggregator::new(&engine.resonance.variants);
        let mut breadth = Vec::new();
        for variant in engine.resonance.variants.names() {
            for side in self.strategies.sides() {
                breadth.extend(aggregator.aggregate(variant, side, &events)?);
            }
        }

        let output = EngineOutput {
            fingerprint: RunFingerprint {
                config_hash,
                data_hash,
            },
            end_date,
            synthetic: self.provider.is_synthetic(),
            reports,
            details,
            resonance,
            breadth,
            skipped,
        };

        info!(
            evaluations = output.reports.len(),
            candidates = output.candidates().count(),
            skipped = output.skipped.len(),
            data_hash = %output.fingerprint.data_hash,
            "evaluation run finished"
        );
        Ok(output)
    }

    fn evaluate_ticker(
        &self,
        ticker: &str,
        intervals: &[Interval],
        controller: &BacktestController<'_>,
        cancel: Option<&CancelToken>,
    ) -> Result<TickerOutput, RunError> {
        if is_cancelled(cancel) {
            return Err(RunError::Cancelled);
        }
        let engine = &self.config.engine;
        let mut skipped = Vec::new();

        let mut series: BTreeMap<Interval, BarSeries> = BTreeMap::new();
        for &interval in intervals {
            match self.provider.fetch(ticker, interval, controller.end_date()) {
                Ok(s) => {
                    series.insert(interval, controller.truncate(&s));
                }
                Err(e) => skipped.push(skip(
                    ticker,
                    Some(interval),
                    None,
                    e.reason_code(),
                    e.to_string(),
                )),
            }
        }
        debug!(%ticker, loaded = series.len(), "fetched intervals");

        let jobs: Vec<(&BarSeries, &dyn SignalStrategy)> = series
            .values()
            .flat_map(|s| self.strategies.iter().map(move |strategy| (s, strategy)))
            .collect();
        let results = fan_out(self.config.run.parallel, &jobs, |&(s, strategy)| {
            evaluate_series(s, strategy, engine)
        });

        let mut reports = Vec::new();
        let mut details = Vec::new();
        let mut events = Vec::new();
        for (&(s, strategy), result) in jobs.iter().zip(results) {
            match result {
                Ok(evaluation) => {
                    if engine.intervals.contains(&s.interval) {
                        reports.push(evaluation.report);
                    }
                    details.extend(evaluation.details);
                    events.extend(evaluation.events);
                }
                Err(e) => skipped.push(skip(
                    ticker,
                    Some(s.interval),
                    Some(strategy.side()),
                    e.reason_code(),
                    e.to_string(),
                )),
            }
        }

        let detector = ResonanceDetector::new(&engine.resonance);
        let mut resonance = Vec::new();
        for (variant, spec) in engine.resonance.variants.iter() {
            let trend = spec.trend_interval.and_then(|i| series.get(&i));
            for side in self.strategies.sides() {
                resonance.push(detector.detect(variant, ticker, side, &details, trend)?);
            }
        }

        details.retain(|d| engine.intervals.contains(&d.event.interval));
        debug!(
            %ticker,
            evaluations = reports.len(),
            signals = events.len(),
            skipped = skipped.len(),
            "ticker evaluated"
        );

        Ok(TickerOutput {
            ticker: ticker.to_string(),
            digest: series_digest(series.values()),
            reports,
            details,
            events,
            resonance,
            skipped,
        })
    }
}

fn is_cancelled(cancel: Option<&CancelToken>) -> bool {
    cancel.is_some_and(|c| c.is_cancelled())
}

fn skip(
    ticker: &str,
    interval: Option<Interval>,
    side: Option<Side>,
    reason: ReasonCode,
    message: String,
) -> SkippedEntry {
    warn!(%ticker, ?interval, ?side, %reason, %message, "skipped");
    SkippedEntry {
        ticker: ticker.to_string(),
        interval,
        side,
        reason,
        message,
    }
}

/// Map `items` in order, over rayon when `parallel`.
fn fan_out<T, R, F>(parallel: bool, items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    if parallel {
        items.par_iter().map(f).collect()
    } else {
        items.iter().map(f).collect()
    }
}
