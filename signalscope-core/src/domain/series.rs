//! Bar series: the unit of work for signal detection.

use serde::{Deserialize, Serialize};

use super::{Bar, Interval};
use crate::error::DataError;

/// Time-ordered bars for one (ticker, interval).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    pub ticker: String,
    pub interval: Interval,
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(ticker: impl Into<String>, interval: Interval, bars: Vec<Bar>) -> Self {
        Self {
            ticker: ticker.into(),
            interval,
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Check that every price is finite and every timestamp is strictly
    /// greater than its predecessor.
    pub fn validate(&self) -> Result<(), DataError> {
        if let Some(index) = self.bars.iter().position(Bar::is_void) {
            return Err(DataError::VoidBar {
                index,
                timestamp: self.bars[index].timestamp,
            });
        }
        for (i, pair) in self.bars.windows(2).enumerate() {
            let (previous, current) = (pair[0].timestamp, pair[1].timestamp);
            if current == previous {
                return Err(DataError::DuplicateTimestamp {
                    index: i + 1,
                    timestamp: current,
                });
            }
            if current < previous {
                return Err(DataError::NonMonotonic {
                    index: i + 1,
                    previous,
                    current,
                });
            }
        }
        Ok(())
    }
}
