//! One (ticker, interval, side) evaluation: detect → detail → forward returns.

use serde::{Deserialize, Serialize};

use crate::components::SignalStrategy;
use crate::config::EngineConfig;
use crate::detail::signal_details;
use crate::domain::{BarSeries, SignalDetail, SignalEvent};
use crate::error::EvalError;
use crate::waikiki::EvaluationReport;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesEvaluation {
    pub events: Vec<SignalEvent>,
    pub details: Vec<SignalDetail>,
    pub report: EvaluationReport,
}

/// Run `strategy` over an already truncated `series` and evaluate its events.
///
/// An empty series (a cutoff before all data) gives an empty evaluation.
pub fn evaluate_series(
    series: &BarSeries,
    strategy: &dyn SignalStrategy,
    config: &EngineConfig,
) -> Result<SeriesEvaluation, EvalError> {
    let events = if series.is_empty() {
        Vec::new()
    } else {
        strategy.detect(series, &config.detector)?
    };
    let details = signal_details(series, &events, &config.detector);
    let report = config.evaluator().evaluate(series, strategy.side(), &events)?;
    Ok(SeriesEvaluation {
        events,
        details,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::CdStrategy;
    use crate::domain::Interval;
    use crate::error::ReasonCode;
    use crate::indicators::make_bars;

    #[test]
    fn empty_series_is_empty_result() {
        let series = BarSeries::new("AAA", Interval::D1, vec![]);
        let out = evaluate_series(&series, &CdStrategy, &EngineConfig::default()).unwrap();
        assert!(out.events.is_empty());
        assert_eq!(out.report.signal_count, 0);
        assert_eq!(out.report.current_time, None);
    }

    #[test]
    fn short_series_reports_insufficient_data() {
        let series = BarSeries::new("AAA", Interval::D1, make_bars(&[1.0; 10]));
        let err = evaluate_series(&series, &CdStrategy, &EngineConfig::default()).unwrap_err();
        assert_eq!(err.reason_code(), ReasonCode::InsufficientData);
    }
}
