//! Retry with exponential backoff on transient provider failures.

use chrono::NaiveDate;
use std::time::Duration;
use tracing::warn;

use signalscope_core::domain::{BarSeries, Interval};

use super::{MarketDataProvider, ProviderError};

pub const DEFAULT_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct RetryingProvider<P> {
    inner: P,
    attempts: u32,
    base_delay: Duration,
}

impl<P: MarketDataProvider> RetryingProvider<P> {
    pub fn new(inner: P) -> Self {
        Self::with_policy(inner, DEFAULT_ATTEMPTS, DEFAULT_BASE_DELAY)
    }

    /// `attempts` counts the first try; zero behaves like one.
    pub fn with_policy(inner: P, attempts: u32, base_delay: Duration) -> Self {
        Self {
            inner,
            attempts: attempts.max(1),
            base_delay,
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Delay before retry number `retry` (1-based): base × 2^(retry-1).
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(retry.saturating_sub(1)))
    }
}

impl<P: MarketDataProvider> MarketDataProvider for RetryingProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch(
        &self,
        ticker: &str,
        interval: Interval,
        end_date: Option<NaiveDate>,
    ) -> Result<BarSeries, ProviderError> {
        let mut attempt = 1;
        loop {
            match self.inner.fetch(ticker, interval, end_date) {
                Err(e) if e.is_transient() && attempt < self.attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        provider = self.inner.name(),
                        %ticker,
                        %interval,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient fetch failure, retrying"
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    fn is_synthetic(&self) -> bool {
        self.inner.is_synthetic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails transiently `failures` times, then returns an empty series.
    struct Flaky {
        failures: u32,
        calls: AtomicU32,
        error: ProviderError,
    }

    impl Flaky {
        fn new(failures: u32, error: ProviderError) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
                error,
            }
        }
    }

    impl MarketDataProvider for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        fn fetch(
            &self,
            ticker: &str,
            interval: Interval,
            _end_date: Option<NaiveDate>,
        ) -> Result<BarSeries, ProviderError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(self.error.clone())
            } else {
                Ok(BarSeries::new(ticker, interval, vec![]))
            }
        }
    }

    #[test]
    fn recovers_within_attempts() {
        let p = RetryingProvider::with_policy(
            Flaky::new(2, ProviderError::Transient("503".into())),
            3,
            Duration::ZERO,
        );
        assert!(p.fetch("AAA", Interval::D1, None).is_ok());
        assert_eq!(p.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn gives_up_after_attempts() {
        let p = RetryingProvider::with_policy(
            Flaky::new(5, ProviderError::Transient("503".into())),
            3,
            Duration::ZERO,
        );
        assert!(p.fetch("AAA", Interval::D1, None).unwrap_err().is_transient());
        assert_eq!(p.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn permanent_errors_are_not_retried() {
        let p = RetryingProvider::with_policy(
            Flaky::new(5, ProviderError::Io("denied".into())),
            3,
            Duration::ZERO,
        );
        assert!(p.fetch("AAA", Interval::D1, None).is_err());
        assert_eq!(p.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn backoff_doubles() {
        let p = RetryingProvider::new(Flaky::new(0, ProviderError::Io(String::new())));
        assert_eq!(p.delay_for(1), Duration::from_millis(250));
        assert_eq!(p.delay_for(2), Duration::from_millis(500));
        assert_eq!(p.delay_for(3), Duration::from_millis(1000));
    }
}
