//! Bar interval vocabulary.
//!
//! Intervals are a closed set parsed from their string label. Ordering follows
//! granularity (finest first), so `BTreeMap<Interval, _>` iterates 5m → 1w.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Trading minutes in one session, used to express hold times.
pub const TRADING_MINUTES_PER_DAY: u32 = 8 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Interval {
    M5,
    M10,
    M15,
    M30,
    H1,
    H2,
    H3,
    H4,
    D1,
    W1,
}

/// How a derived interval is built from a finer native one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivation {
    /// `factor` consecutive source bars within one session form one bar.
    Chunk { source: Interval, factor: usize },
    /// Source bars sharing an ISO week form one bar.
    IsoWeek { source: Interval },
}

impl Interval {
    pub const ALL: [Interval; 10] = [
        Interval::M5,
        Interval::M10,
        Interval::M15,
        Interval::M30,
        Interval::H1,
        Interval::H2,
        Interval::H3,
        Interval::H4,
        Interval::D1,
        Interval::W1,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::M5 => "5m",
            Self::M10 => "10m",
            Self::M15 => "15m",
            Self::M30 => "30m",
            Self::H1 => "1h",
            Self::H2 => "2h",
            Self::H3 => "3h",
            Self::H4 => "4h",
            Self::D1 => "1d",
            Self::W1 => "1w",
        }
    }

    /// Length of one bar in trading minutes (8-hour sessions, 5-session weeks).
    pub fn trading_minutes(&self) -> u32 {
        match self {
            Self::M5 => 5,
            Self::M10 => 10,
            Self::M15 => 15,
            Self::M30 => 30,
            Self::H1 => 60,
            Self::H2 => 120,
            Self::H3 => 180,
            Self::H4 => 240,
            Self::D1 => TRADING_MINUTES_PER_DAY,
            Self::W1 => 5 * TRADING_MINUTES_PER_DAY,
        }
    }

    /// Weight of the interval in the signal score. Coarser bars weigh more.
    pub fn score_weight(&self) -> f64 {
        match self {
            Self::M5 => 2.0,
            Self::M10 => 3.0,
            Self::M15 => 4.0,
            Self::M30 => 5.0,
            Self::H1 => 6.0,
            Self::H2 => 7.0,
            Self::H3 => 8.0,
            Self::H4 => 9.0,
            Self::D1 => 10.0,
            Self::W1 => 0.0,
        }
    }

    pub fn is_intraday(&self) -> bool {
        !matches!(self, Self::D1 | Self::W1)
    }

    /// Native interval this one is resampled from, if it is derived.
    pub fn derivation(&self) -> Option<Derivation> {
        match self {
            Self::M10 => Some(Derivation::Chunk {
                source: Self::M5,
                factor: 2,
            }),
            Self::H2 => Some(Derivation::Chunk {
                source: Self::H1,
                factor: 2,
            }),
            Self::H3 => Some(Derivation::Chunk {
                source: Self::H1,
                factor: 3,
            }),
            Self::H4 => Some(Derivation::Chunk {
                source: Self::H1,
                factor: 4,
            }),
            Self::W1 => Some(Derivation::IsoWeek { source: Self::D1 }),
            _ => None,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Interval {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .iter()
            .copied()
            .find(|i| i.label() == s.trim())
            .ok_or_else(|| ConfigError::UnknownInterval(s.to_string()))
    }
}

impl TryFrom<String> for Interval {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Interval> for String {
    fn from(value: Interval) -> Self {
        value.label().to_string()
    }
}

/// Format a number of trading minutes as e.g. `2hr30min` or `1day2hr`.
pub fn format_hold_time(total_minutes: u32) -> String {
    if total_minutes < 60 {
        return format!("{total_minutes}min");
    }

    let days = total_minutes / TRADING_MINUTES_PER_DAY;
    let rest = total_minutes % TRADING_MINUTES_PER_DAY;
    let hours = rest / 60;
    let minutes = rest % 60;

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{days}day{}", if days > 1 { "s" } else { "" }));
    }
    if hours > 0 {
        out.push_str(&format!("{hours}hr"));
    }
    if minutes > 0 {
        out.push_str(&format!("{minutes}min"));
    }
    if out.is_empty() {
        out.push_str("0min");
    }
    out
}
