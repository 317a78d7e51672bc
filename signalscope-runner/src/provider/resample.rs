//! Serve derived intervals (10m, 2h, 3h, 4h, 1w) by resampling their source.
//!
//! The inner provider is asked first; only a missing or unsupported derived
//! interval falls back to resampling. The source is fetched with the same
//! cutoff, so a partial final bucket is built from bars on or before it.

use chrono::NaiveDate;
use tracing::debug;

use signalscope_core::data::resample_series;
use signalscope_core::domain::{BarSeries, Derivation, Interval};

use super::{MarketDataProvider, ProviderError};

#[derive(Debug, Clone)]
pub struct ResamplingProvider<P> {
    inner: P,
}

impl<P: MarketDataProvider> ResamplingProvider<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: MarketDataProvider> MarketDataProvider for ResamplingProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch(
        &self,
        ticker: &str,
        interval: Interval,
        end_date: Option<NaiveDate>,
    ) -> Result<BarSeries, ProviderError> {
        let err = match self.inner.fetch(ticker, interval, end_date) {
            Ok(series) => return Ok(series),
            Err(e) => e,
        };
        let derivation = match interval.derivation() {
            Some(d) if err.is_missing() => d,
            _ => return Err(err),
        };
        let source_interval = match derivation {
            Derivation::Chunk { source, .. } | Derivation::IsoWeek { source } => source,
        };

        let source = self.fetch(ticker, source_interval, end_date)?;
        source.validate()?;
        debug!(%ticker, %interval, source = %source_interval, bars = source.len(), "resampling");
        resample_series(&source, interval).map_err(|_| ProviderError::Unsupported { interval })
    }

    fn is_synthetic(&self) -> bool {
        self.inner.is_synthetic()
    }
}
