//! Multi-interval confluence detection ("1234" / "5230").
//!
//! A variant names a set of intervals. For one ticker and side the detector
//! takes the latest signal on each of those intervals and looks for an anchor
//! date that enough of them fall on or shortly before, measured in weekdays.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{BarSeries, Interval, Side, SignalDetail};
use crate::error::ConfigError;
use crate::components::Indicator;
use crate::indicators::Ema;

/// Fast and slow close EMA spans of the trend check.
pub const TREND_FAST_SPAN: usize = 24;
pub const TREND_SLOW_SPAN: usize = 89;

/// Interval membership of one variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantSpec {
    /// Resolution suffix the variant's labels are written in ("h" or "m").
    pub unit_suffix: String,
    pub intervals: Vec<Interval>,
    #[serde(default)]
    pub trend_interval: Option<Interval>,
}

/// Variant name → interval set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResonanceTable {
    variants: BTreeMap<String, VariantSpec>,
}

impl Default for ResonanceTable {
    fn default() -> Self {
        let mut variants = BTreeMap::new();
        variants.insert(
            "1234".to_string(),
            VariantSpec {
                unit_suffix: "h".into(),
                intervals: vec![Interval::H1, Interval::H2, Interval::H3, Interval::H4],
                trend_interval: Some(Interval::D1),
            },
        );
        variants.insert(
            "5230".to_string(),
            VariantSpec {
                unit_suffix: "m".into(),
                intervals: vec![Interval::M5, Interval::M10, Interval::M15, Interval::M30],
                trend_interval: Some(Interval::H1),
            },
        );
        Self { variants }
    }
}

impl ResonanceTable {
    pub fn new(variants: BTreeMap<String, VariantSpec>) -> Self {
        Self { variants }
    }

    pub fn get(&self, variant: &str) -> Result<&VariantSpec, ConfigError> {
        self.variants
            .get(variant)
            .ok_or_else(|| ConfigError::UnknownVariant(variant.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariantSpec)> {
        self.variants.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Every interval any variant needs, including trend intervals.
    pub fn required_intervals(&self) -> Vec<Interval> {
        let mut all: Vec<Interval> = self
            .variants
            .values()
            .flat_map(|v| v.intervals.iter().copied().chain(v.trend_interval))
            .collect();
        all.sort();
        all.dedup();
        all
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResonanceConfig {
    /// Window size in weekdays; 1 means the same day.
    pub confirmation_days: u32,
    /// Intervals that must match; `None` means all of them.
    pub quorum: Option<usize>,
    pub variants: ResonanceTable,
}

impl Default for ResonanceConfig {
    fn default() -> Self {
        Self {
            confirmation_days: 1,
            quorum: None,
            variants: ResonanceTable::default(),
        }
    }
}

impl ResonanceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.confirmation_days == 0 {
            return Err(ConfigError::invalid(
                "resonance.confirmation_days",
                "must be > 0",
            ));
        }
        for (name, spec) in self.variants.iter() {
            if spec.intervals.is_empty() {
                return Err(ConfigError::invalid(
                    "resonance.variants",
                    format!("variant '{name}' lists no intervals"),
                ));
            }
            if let Some(q) = self.quorum {
                if q == 0 || q > spec.intervals.len() {
                    return Err(ConfigError::invalid(
                        "resonance.quorum",
                        format!(
                            "{q} is outside 1..={} for variant '{name}'",
                            spec.intervals.len()
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// A fired confluence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakoutCandidate {
    pub ticker: String,
    pub variant: String,
    pub side: Side,
    pub matched_intervals: Vec<Interval>,
    pub date: NaiveDate,
    pub signal_price: f64,
    /// Trend EMAs agree with the side; `None` when no trend bars were given.
    pub trend_aligned: Option<bool>,
}

/// Result of one detection, fired or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResonanceOutcome {
    pub ticker: String,
    pub variant: String,
    pub side: Side,
    pub matched: Vec<Interval>,
    pub missing: Vec<Interval>,
    pub candidate: Option<BreakoutCandidate>,
}

pub struct ResonanceDetector<'a> {
    config: &'a ResonanceConfig,
}

impl<'a> ResonanceDetector<'a> {
    pub fn new(config: &'a ResonanceConfig) -> Self {
        Self { config }
    }

    /// Detect confluence of `variant` for one ticker and side.
    ///
    /// `signals` may span any intervals; only the latest one per member
    /// interval is considered. `trend` is the variant's trend series, if loaded.
    pub fn detect(
        &self,
        variant: &str,
        ticker: &str,
        side: Side,
        signals: &[SignalDetail],
        trend: Option<&BarSeries>,
    ) -> Result<ResonanceOutcome, ConfigError> {
        let spec = self.config.variants.get(variant)?;

        let mut latest: BTreeMap<Interval, &SignalDetail> = BTreeMap::new();
        for detail in signals
            .iter()
            .filter(|d| d.event.side == side && spec.intervals.contains(&d.event.interval))
        {
            let slot = latest.entry(detail.event.interval).or_insert(detail);
            if detail.event.timestamp > slot.event.timestamp {
                *slot = detail;
            }
        }

        let window = self.config.confirmation_days;
        let mut best: Option<(NaiveDate, Vec<Interval>)> = None;
        for anchor in latest.values().map(|d| d.event.date()) {
            let members: Vec<Interval> = latest
                .iter()
                .filter(|(_, d)| {
                    let date = d.event.date();
                    date <= anchor && weekdays_between(date, anchor) < window
                })
                .map(|(&i, _)| i)
                .collect();
            let better = match &best {
                None => true,
                Some((date, current)) => {
                    members.len() > current.len()
                        || (members.len() == current.len() && anchor > *date)
                }
            };
            if better {
                best = Some((anchor, members));
            }
        }

        let (anchor, matched) = best.unwrap_or((NaiveDate::MIN, Vec::new()));
        let missing: Vec<Interval> = spec
            .intervals
            .iter()
            .copied()
            .filter(|i| !matched.contains(i))
            .collect();

        let quorum = self.config.quorum.unwrap_or(spec.intervals.len()).max(1);
        let candidate = if matched.len() >= quorum {
            matched
                .iter()
                .filter_map(|i| latest.get(i))
                .max_by_key(|d| d.event.timestamp)
                .map(|recent| BreakoutCandidate {
                    ticker: ticker.to_string(),
                    variant: variant.to_string(),
                    side,
                    matched_intervals: matched.clone(),
                    date: anchor,
                    signal_price: recent.signal_price,
                    trend_aligned: trend.and_then(|t| trend_alignment(t, side, anchor)),
                })
        } else {
            None
        };

        Ok(ResonanceOutcome {
            ticker: ticker.to_string(),
            variant: variant.to_string(),
            side,
            matched,
            missing,
            candidate,
        })
    }
}

/// Whether the trend EMAs agree with `side` at the last trend bar on or
/// before `date`.
pub fn trend_alignment(trend: &BarSeries, side: Side, date: NaiveDate) -> Option<bool> {
    let index = trend.bars.iter().rposition(|b| b.date() <= date)?;
    let fast = Ema::new(TREND_FAST_SPAN).compute(&trend.bars)[index];
    let slow = Ema::new(TREND_SLOW_SPAN).compute(&trend.bars)[index];
    if fast.is_nan() || slow.is_nan() {
        return None;
    }
    Some(match side {
        Side::Cd => fast > slow,
        Side::Mc => fast < slow,
    })
}

/// Trading days in `(from, to]`; zero when `to <= from`.
///
/// Weekdays count once each. A weekend `to` counts as a session of its own, so
/// two distinct dates are always at least one day apart.
pub fn weekdays_between(from: NaiveDate, to: NaiveDate) -> u32 {
    if to <= from {
        return 0;
    }
    let days = (to - from).num_days();
    let full_weeks = days / 7;
    let mut count = full_weeks * 5;
    let mut day = from + chrono::Duration::days(full_weeks * 7);
    while day < to {
        day += chrono::Duration::days(1);
        if !is_weekend(day) {
            count += 1;
        }
    }
    if is_weekend(to) {
        count += 1;
    }
    count as u32
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
