//! Deterministic synthetic bars for demos and benches.
//!
//! Each (ticker, interval) gets its own random walk seeded from
//! BLAKE3(`"{ticker}:{interval}"`), so the same request always yields the same
//! bars. Only native intervals are generated; wrap in a
//! [`ResamplingProvider`](super::ResamplingProvider) for derived ones.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use signalscope_core::domain::{Bar, BarSeries, Interval, TRADING_MINUTES_PER_DAY};

use super::{cut_at, MarketDataProvider, ProviderError};

#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    start: NaiveDate,
    sessions: usize,
    session_open_hour: u32,
}

impl SyntheticProvider {
    /// `sessions` weekdays of bars starting at `start`.
    pub fn new(start: NaiveDate, sessions: usize) -> Self {
        Self {
            start,
            sessions,
            session_open_hour: 9,
        }
    }

    fn session_dates(&self) -> Vec<NaiveDate> {
        let mut dates = Vec::with_capacity(self.sessions);
        let mut day = self.start;
        while dates.len() < self.sessions {
            if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
                dates.push(day);
            }
            day += Duration::days(1);
        }
        dates
    }

    fn timestamps(&self, interval: Interval) -> Vec<NaiveDateTime> {
        let dates = self.session_dates();
        if !interval.is_intraday() {
            return dates.iter().filter_map(|d| d.and_hms_opt(0, 0, 0)).collect();
        }
        let minutes = interval.trading_minutes();
        let per_session = TRADING_MINUTES_PER_DAY / minutes;
        dates
            .iter()
            .filter_map(|d| d.and_hms_opt(self.session_open_hour, 0, 0))
            .flat_map(|open| {
                (1..=per_session).map(move |k| open + Duration::minutes(i64::from(k * minutes)))
            })
            .collect()
    }
}

/// Generate a random walk over `timestamps`.
///
/// Per-bar volatility scales with the square root of the bar length.
pub fn generate_walk(ticker: &str, interval: Interval, timestamps: &[NaiveDateTime]) -> Vec<Bar> {
    let seed = blake3::hash(format!("{ticker}:{}", interval.label()).as_bytes());
    let mut rng = StdRng::from_seed(*seed.as_bytes());

    let scale = (f64::from(interval.trading_minutes()) / f64::from(TRADING_MINUTES_PER_DAY)).sqrt();
    let mut price = 100.0_f64;
    let mut bars = Vec::with_capacity(timestamps.len());
    for &timestamp in timestamps {
        let step: f64 = rng.gen_range(-0.03..0.03) * scale;
        let open = price;
        let close = (price * (1.0 + step)).max(1.0);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01) * scale);
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01) * scale);
        let volume = rng.gen_range(50_000..500_000u64);
        bars.push(Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        });
        price = close;
    }
    bars
}

impl MarketDataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        ticker: &str,
        interval: Interval,
        end_date: Option<NaiveDate>,
    ) -> Result<BarSeries, ProviderError> {
        if interval.derivation().is_some() {
            return Err(ProviderError::Unsupported { interval });
        }
        let bars = generate_walk(ticker, interval, &self.timestamps(interval));
        Ok(cut_at(BarSeries::new(ticker, interval, bars), end_date))
    }

    fn is_synthetic(&self) -> bool {
        true
    }
}
