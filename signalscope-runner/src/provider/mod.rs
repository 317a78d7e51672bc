//! Market data providers.
//!
//! A provider returns the bars of one (ticker, interval), optionally cut at a
//! backtest end date. Providers compose: [`ResamplingProvider`] serves derived
//! intervals from their source and [`RetryingProvider`] retries transient
//! failures of the provider it wraps.

pub mod csv;
pub mod memory;
pub mod resample;
pub mod retry;
pub mod synthetic;

use chrono::NaiveDate;
use signalscope_core::domain::{BarSeries, Interval};
use signalscope_core::error::{DataError, EvalError, ReasonCode};
use thiserror::Error;

pub use self::csv::CsvDirectoryProvider;
pub use memory::InMemoryProvider;
pub use resample::ResamplingProvider;
pub use retry::RetryingProvider;
pub use synthetic::SyntheticProvider;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    #[error("no {interval} data for {ticker}")]
    NotFound { ticker: String, interval: Interval },

    #[error("provider does not serve {interval} bars")]
    Unsupported { interval: Interval },

    #[error("transient provider failure: {0}")]
    Transient(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("parse error in {source_name} at record {record}: {reason}")]
    Parse {
        source_name: String,
        record: usize,
        reason: String,
    },

    #[error("source bars rejected: {0}")]
    Data(#[from] DataError),
}

impl ProviderError {
    /// Worth retrying after a delay.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Whether a resampling wrapper may fall back to the source interval.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Unsupported { .. })
    }

    pub fn reason_code(&self) -> ReasonCode {
        match self {
            Self::Data(e) => EvalError::Data(e.clone()).reason_code(),
            _ => ReasonCode::Provider,
        }
    }
}

/// Source of bar series.
///
/// `end_date` is an inclusive cutoff; implementations must not return bars
/// dated after it.
pub trait MarketDataProvider: Send + Sync {
    fn name(&self) -> &str;

    fn fetch(
        &self,
        ticker: &str,
        interval: Interval,
        end_date: Option<NaiveDate>,
    ) -> Result<BarSeries, ProviderError>;

    /// True when bars are generated rather than observed.
    fn is_synthetic(&self) -> bool {
        false
    }
}

impl<P: MarketDataProvider + ?Sized> MarketDataProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(
        &self,
        ticker: &str,
        interval: Interval,
        end_date: Option<NaiveDate>,
    ) -> Result<BarSeries, ProviderError> {
        (**self).fetch(ticker, interval, end_date)
    }

    fn is_synthetic(&self) -> bool {
        (**self).is_synthetic()
    }
}

/// Keep bars dated on or before `end_date`.
pub(crate) fn cut_at(series: BarSeries, end_date: Option<NaiveDate>) -> BarSeries {
    match end_date {
        Some(end) => {
            let BarSeries {
                ticker,
                interval,
                bars,
            } = series;
            let bars = bars.into_iter().filter(|b| b.date() <= end).collect();
            BarSeries::new(ticker, interval, bars)
        }
        None => series,
    }
}
