//! Output record sets for a presentation layer.
//!
//! [`EvaluationRow`] serializes flat, with one `success_rate_{N}`,
//! `avg_return_{N}`, `test_count_{N}` and `avg_volume_{N}` column per offset.
//! Success rates are percentages here; the core statistics keep fractions.

use chrono::{NaiveDate, NaiveDateTime};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use signalscope_core::breadth::BreadthCount;
use signalscope_core::domain::{Interval, Side, SignalDetail};
use signalscope_core::resonance::BreakoutCandidate;
use signalscope_core::waikiki::EvaluationReport;

use crate::fingerprint::RunFingerprint;
use crate::runner::{EngineOutput, SkippedEntry};
use crate::selection::{best_intervals, good_signals, BestIntervalRow, PeriodRange, SelectionConfig};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV output is not valid UTF-8")]
    Utf8,
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Columns for one forward offset.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodColumns {
    pub offset: usize,
    /// Percent.
    pub success_rate: Option<f64>,
    pub avg_return: Option<f64>,
    pub test_count: usize,
    pub avg_volume: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRow {
    pub ticker: String,
    pub interval: Interval,
    pub side: Side,
    pub signal_count: usize,
    pub latest_signal: Option<NaiveDateTime>,
    pub latest_signal_price: Option<f64>,
    pub current_time: Option<NaiveDateTime>,
    pub current_price: Option<f64>,
    pub current_period: Option<usize>,
    pub max_return: Option<f64>,
    pub min_return: Option<f64>,
    /// Offsets `0..=horizon`, in order.
    pub periods: Vec<PeriodColumns>,
}

impl EvaluationRow {
    pub fn from_report(report: &EvaluationReport, horizon: usize) -> Self {
        let periods = (0..=horizon)
            .map(|offset| match report.statistic(offset) {
                Some(s) => PeriodColumns {
                    offset,
                    success_rate: Some(s.success_rate * 100.0),
                    avg_return: Some(s.mean),
                    test_count: s.sample_count,
                    avg_volume: s.mean_volume_ratio,
                },
                None => PeriodColumns {
                    offset,
                    success_rate: None,
                    avg_return: None,
                    test_count: 0,
                    avg_volume: None,
                },
            })
            .collect();
        Self {
            ticker: report.ticker.clone(),
            interval: report.interval,
            side: report.side,
            signal_count: report.signal_count,
            latest_signal: report.latest_signal,
            latest_signal_price: report.latest_signal_price,
            current_time: report.current_time,
            current_price: report.current_price,
            current_period: report.current_period,
            max_return: report.max_return,
            min_return: report.min_return,
            periods,
        }
    }

    pub fn period(&self, offset: usize) -> Option<&PeriodColumns> {
        self.periods.get(offset)
    }

    /// Column names in serialization order.
    pub fn columns(horizon: usize) -> Vec<String> {
        let mut columns: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
        for n in 0..=horizon {
            columns.push(format!("success_rate_{n}"));
            columns.push(format!("avg_return_{n}"));
            columns.push(format!("test_count_{n}"));
            columns.push(format!("avg_volume_{n}"));
        }
        columns
    }

    fn cells(&self) -> Vec<String> {
        let mut cells = vec![
            self.ticker.clone(),
            self.interval.label().to_string(),
            self.side.label().to_string(),
            self.signal_count.to_string(),
            opt(self.latest_signal),
            opt(self.latest_signal_price),
            opt(self.current_time),
            opt(self.current_price),
            opt(self.current_period),
            opt(self.max_return),
            opt(self.min_return),
        ];
        for p in &self.periods {
            cells.push(opt(p.success_rate));
            cells.push(opt(p.avg_return));
            cells.push(p.test_count.to_string());
            cells.push(opt(p.avg_volume));
        }
        cells
    }
}

const FIXED_COLUMNS: [&str; 11] = [
    "ticker",
    "interval",
    "side",
    "signal_count",
    "latest_signal",
    "latest_signal_price",
    "current_time",
    "current_price",
    "current_period",
    "max_return",
    "min_return",
];

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl Serialize for EvaluationRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FIXED_COLUMNS.len() + 4 * self.periods.len()))?;
        map.serialize_entry("ticker", &self.ticker)?;
        map.serialize_entry("interval", &self.interval)?;
        map.serialize_entry("side", &self.side)?;
        map.serialize_entry("signal_count", &self.signal_count)?;
        map.serialize_entry("latest_signal", &self.latest_signal)?;
        map.serialize_entry("latest_signal_price", &self.latest_signal_price)?;
        map.serialize_entry("current_time", &self.current_time)?;
        map.serialize_entry("current_price", &self.current_price)?;
        map.serialize_entry("current_period", &self.current_period)?;
        map.serialize_entry("max_return", &self.max_return)?;
        map.serialize_entry("min_return", &self.min_return)?;
        for p in &self.periods {
            let n = p.offset;
            map.serialize_entry(&format!("success_rate_{n}"), &p.success_rate)?;
            map.serialize_entry(&format!("avg_return_{n}"), &p.avg_return)?;
            map.serialize_entry(&format!("test_count_{n}"), &p.test_count)?;
            map.serialize_entry(&format!("avg_volume_{n}"), &p.avg_volume)?;
        }
        map.end()
    }
}

/// One resolved forward return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionRow {
    pub ticker: String,
    pub interval: Interval,
    pub side: Side,
    pub signal_id: usize,
    pub period: usize,
    #[serde(rename = "return")]
    pub return_pct: f64,
    pub volume_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakoutRow {
    pub ticker: String,
    /// Comma-joined interval labels, finest first.
    pub intervals: String,
    pub side: Side,
    pub variant: String,
    pub date: NaiveDate,
    pub signal_price: f64,
    pub trend_aligned: Option<bool>,
    pub matched: usize,
}

impl From<&BreakoutCandidate> for BreakoutRow {
    fn from(c: &BreakoutCandidate) -> Self {
        Self {
            ticker: c.ticker.clone(),
            intervals: c
                .matched_intervals
                .iter()
                .map(|i| i.label())
                .collect::<Vec<_>>()
                .join(","),
            side: c.side,
            variant: c.variant.clone(),
            date: c.date,
            signal_price: c.signal_price,
            trend_aligned: c.trend_aligned,
            matched: c.matched_intervals.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreadthRow {
    pub date: NaiveDate,
    pub count: usize,
}

/// Daily breadth of one variant and side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreadthTable {
    pub variant: String,
    pub side: Side,
    pub rows: Vec<BreadthRow>,
}

/// Group counts per (variant, side); rows stay in date order.
pub fn breadth_tables(counts: &[BreadthCount]) -> Vec<BreadthTable> {
    let mut grouped: BTreeMap<(&str, Side), Vec<BreadthRow>> = BTreeMap::new();
    for c in counts {
        grouped
            .entry((c.variant.as_str(), c.side))
            .or_default()
            .push(BreadthRow {
                date: c.date,
                count: c.count,
            });
    }
    grouped
        .into_iter()
        .map(|((variant, side), mut rows)| {
            rows.sort_by_key(|r| r.date);
            BreadthTable {
                variant: variant.to_string(),
                side,
                rows,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDetailRow {
    pub ticker: String,
    pub interval: Interval,
    pub side: Side,
    pub score: f64,
    pub signal_date: NaiveDateTime,
    pub signal_price: f64,
    pub breakthrough_date: Option<NaiveDateTime>,
}

impl From<&SignalDetail> for SignalDetailRow {
    fn from(d: &SignalDetail) -> Self {
        Self {
            ticker: d.event.ticker.clone(),
            interval: d.event.interval,
            side: d.event.side,
            score: d.score,
            signal_date: d.event.timestamp,
            signal_price: d.signal_price,
            breakthrough_date: d.breakthrough,
        }
    }
}

/// Best-interval rows of one side and period range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestIntervalTable {
    pub side: Side,
    pub range: PeriodRange,
    pub rows: Vec<BestIntervalRow>,
}

/// Every record set of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSets {
    pub fingerprint: RunFingerprint,
    pub end_date: Option<NaiveDate>,
    pub synthetic: bool,
    pub evaluations: Vec<EvaluationRow>,
    pub distributions: Vec<DistributionRow>,
    pub breakouts: Vec<BreakoutRow>,
    pub breadth: Vec<BreadthTable>,
    pub signal_details: Vec<SignalDetailRow>,
    pub best_intervals: Vec<BestIntervalTable>,
    pub good_signals: Vec<BestIntervalRow>,
    pub skipped: Vec<SkippedEntry>,
}

impl RecordSets {
    pub fn build(output: &EngineOutput, horizon: usize, selection: &SelectionConfig) -> Self {
        let sides: Vec<Side> = {
            let mut sides: Vec<Side> = output.reports.iter().map(|r| r.side).collect();
            sides.sort();
            sides.dedup();
            sides
        };

        let best_tables = sides
            .iter()
            .flat_map(|&side| {
                PeriodRange::ALL.into_iter().map(move |range| BestIntervalTable {
                    side,
                    range,
                    rows: best_intervals(output.reports_for(side), side, range, selection),
                })
            })
            .collect();
        let good = sides
            .iter()
            .flat_map(|&side| good_signals(output.reports_for(side), side, selection))
            .collect();

        Self {
            fingerprint: output.fingerprint.clone(),
            end_date: output.end_date,
            synthetic: output.synthetic,
            evaluations: output
                .reports
                .iter()
                .map(|r| EvaluationRow::from_report(r, horizon))
                .collect(),
            distributions: output
                .reports
                .iter()
                .flat_map(|r| r.samples.iter())
                .map(|s| DistributionRow {
                    ticker: s.ticker.clone(),
                    interval: s.interval,
                    side: s.side,
                    signal_id: s.signal_id,
                    period: s.period_offset,
                    return_pct: s.return_pct,
                    volume_ratio: s.volume_ratio,
                })
                .collect(),
            breakouts: output.candidates().map(BreakoutRow::from).collect(),
            breadth: breadth_tables(&output.breadth),
            signal_details: output.details.iter().map(SignalDetailRow::from).collect(),
            best_intervals: best_tables,
            good_signals: good,
            skipped: output.skipped.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Evaluation rows as CSV with the flat per-offset columns.
pub fn evaluations_csv(rows: &[EvaluationRow], horizon: usize) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(EvaluationRow::columns(horizon))?;
    for row in rows {
        wtr.write_record(row.cells())?;
    }
    let data = wtr.into_inner().map_err(|e| ExportError::Csv(e.into_error().into()))?;
    String::from_utf8(data).map_err(|_| ExportError::Utf8)
}
