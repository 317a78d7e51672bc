//! Bar: the fundamental market data unit.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// OHLCV bar for one ticker at one interval.
///
/// The timestamp is the bar's exchange-local time. Daily and weekly bars carry
/// midnight of their trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Calendar trading day of the bar.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Returns true if any price field is NaN or infinite (void bar).
    pub fn is_void(&self) -> bool {
        ![self.open, self.high, self.low, self.close]
            .iter()
            .all(|p| p.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000,
        }
    }

    #[test]
    fn finite_bar_is_not_void() {
        assert!(!sample_bar().is_void());
    }

    #[test]
    fn bar_detects_void() {
        let mut bar = sample_bar();
        bar.open = f64::NAN;
        assert!(bar.is_void());

        let mut bar = sample_bar();
        bar.close = f64::INFINITY;
        assert!(bar.is_void());
    }

    #[test]
    fn date_drops_time_of_day() {
        assert_eq!(
            sample_bar().date(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
    }
}
