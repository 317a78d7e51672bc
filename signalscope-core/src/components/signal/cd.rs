//! CD: bottom-fishing buy trigger on a bottom MACD divergence.

use super::divergence::{divergence_flags, Polarity};
use super::{DetectorConfig, SignalStrategy};
use crate::domain::{Bar, Side};

#[derive(Debug, Clone, Copy, Default)]
pub struct CdStrategy;

impl SignalStrategy for CdStrategy {
    fn name(&self) -> &str {
        "cd_divergence"
    }

    fn side(&self) -> Side {
        Side::Cd
    }

    fn trigger(&self, bars: &[Bar], config: &DetectorConfig) -> Vec<bool> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        divergence_flags(&closes, config, Polarity::Bottom)
    }
}
