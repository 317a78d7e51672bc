//! Signal vocabulary: side, detected events and their per-event details.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Interval;
use crate::error::ConfigError;

/// Which way a signal points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// Bottom-fishing buy signal.
    #[serde(rename = "CD")]
    Cd,
    /// Sell signal.
    #[serde(rename = "MC")]
    Mc,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Cd, Side::Mc];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Cd => "CD",
            Self::Mc => "MC",
        }
    }

    /// A CD call succeeds when price rises, an MC call when it falls.
    pub fn is_success(&self, return_pct: f64) -> bool {
        match self {
            Self::Cd => return_pct > 0.0,
            Self::Mc => return_pct < 0.0,
        }
    }

    /// Return expressed so that larger is better for this side.
    pub fn favourable(&self, return_pct: f64) -> f64 {
        match self {
            Self::Cd => return_pct,
            Self::Mc => -return_pct,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Side {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CD" => Ok(Self::Cd),
            "MC" => Ok(Self::Mc),
            other => Err(ConfigError::invalid(
                "side",
                format!("'{other}' is not one of CD, MC"),
            )),
        }
    }
}

/// A discrete signal detected on one bar of one series.
///
/// Events are derived on every run and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub ticker: String,
    pub interval: Interval,
    pub side: Side,
    pub timestamp: NaiveDateTime,
    pub bar_index: usize,
}

impl SignalEvent {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// A signal event enriched with its price, score and follow-up breakthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDetail {
    pub event: SignalEvent,
    pub signal_price: f64,
    pub score: f64,
    /// First channel breakthrough at or after the signal bar, if any.
    pub breakthrough: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_direction_follows_side() {
        assert!(Side::Cd.is_success(0.5));
        assert!(!Side::Cd.is_success(0.0));
        assert!(Side::Mc.is_success(-0.5));
        assert!(!Side::Mc.is_success(1.0));
    }

    #[test]
    fn favourable_flips_for_mc() {
        assert_eq!(Side::Cd.favourable(4.0), 4.0);
        assert_eq!(Side::Mc.favourable(-4.0), 4.0);
    }

    #[test]
    fn side_parses_case_insensitively() {
        assert_eq!("cd".parse::<Side>().unwrap(), Side::Cd);
        assert_eq!("MC".parse::<Side>().unwrap(), Side::Mc);
        assert!("buy".parse::<Side>().is_err());
    }

    #[test]
    fn side_serializes_as_label() {
        assert_eq!(serde_json::to_string(&Side::Mc).unwrap(), "\"MC\"");
    }
}
