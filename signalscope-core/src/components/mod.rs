//! Component traits: indicators and signal trigger strategies.
//!
//! Strategies are portfolio-free and stateless. They receive bars and detector
//! parameters and return per-bar trigger flags; events are derived from those.

pub mod indicator;
pub mod signal;

pub use indicator::{Field, Indicator};
pub use signal::{strategy_for, CdStrategy, DetectorConfig, McStrategy, SignalStrategy};
