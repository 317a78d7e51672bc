//! Property tests for the runner: cutoff isolation and mode equivalence on
//! synthetic universes.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use std::collections::BTreeMap;

use signalscope_core::domain::Interval;
use signalscope_core::resonance::ResonanceTable;
use signalscope_runner::config::RunConfig;
use signalscope_runner::provider::{ResamplingProvider, SyntheticProvider};
use signalscope_runner::runner::Runner;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
}

fn config(end_date: Option<NaiveDate>, parallel: bool) -> RunConfig {
    let mut config = RunConfig::default();
    config.engine.intervals = vec![Interval::D1, Interval::W1];
    config.engine.horizon = 10;
    config.engine.resonance.variants = ResonanceTable::new(BTreeMap::new());
    config.run.end_date = end_date;
    config.run.parallel = parallel;
    config
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// Longer history past the cutoff never changes a backtest.
    #[test]
    fn history_past_cutoff_is_invisible(offset in 120i64..360, extra in 1usize..200) {
        let end = start() + Duration::days(offset);
        let tickers = vec!["SPY".to_string(), "QQQ".to_string()];

        let short = ResamplingProvider::new(SyntheticProvider::new(start(), 300));
        let long = ResamplingProvider::new(SyntheticProvider::new(start(), 300 + extra));

        let a = Runner::new(short, config(Some(end), true)).unwrap().run(&tickers, None).unwrap();
        let b = Runner::new(long, config(Some(end), true)).unwrap().run(&tickers, None).unwrap();
        prop_assert_eq!(a, b);
    }

    /// Parallel and sequential evaluation agree on every record.
    #[test]
    fn modes_agree(sessions in 60usize..300) {
        let tickers = vec!["AAA".to_string(), "BBB".to_string(), "CCC".to_string()];
        let provider = ResamplingProvider::new(SyntheticProvider::new(start(), sessions));

        let a = Runner::new(provider.clone(), config(None, true))
            .unwrap()
            .run(&tickers, None)
            .unwrap();
        let b = Runner::new(provider, config(None, false))
            .unwrap()
            .run(&tickers, None)
            .unwrap();
        prop_assert_eq!(a.reports, b.reports);
        prop_assert_eq!(a.details, b.details);
        prop_assert_eq!(a.skipped, b.skipped);
        prop_assert_eq!(a.fingerprint.data_hash, b.fingerprint.data_hash);
    }
}
