//! Bar preparation: resampling derived intervals.

pub mod resample;

pub use resample::{resample_bars, resample_series};
