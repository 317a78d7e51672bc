//! MC: sell trigger on a top MACD divergence, the mirror of CD.

use super::divergence::{divergence_flags, Polarity};
use super::{DetectorConfig, SignalStrategy};
use crate::domain::{Bar, Side};

#[derive(Debug, Clone, Copy, Default)]
pub struct McStrategy;

impl SignalStrategy for McStrategy {
    fn name(&self) -> &str {
        "mc_divergence"
    }

    fn side(&self) -> Side {
        Side::Mc
    }

    fn trigger(&self, bars: &[Bar], config: &DetectorConfig) -> Vec<bool> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        divergence_flags(&closes, config, Polarity::Top)
    }
}
