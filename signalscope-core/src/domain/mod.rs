//! Domain types for SignalScope

pub mod bar;
pub mod interval;
pub mod series;
pub mod signal;

pub use bar::Bar;
pub use interval::{format_hold_time, Derivation, Interval, TRADING_MINUTES_PER_DAY};
pub use series::BarSeries;
pub use signal::{Side, SignalDetail, SignalEvent};

/// Ticker type alias
pub type Ticker = String;
