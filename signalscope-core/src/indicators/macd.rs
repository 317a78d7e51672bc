//! MACD: difference of two close EMAs, its signal line and the histogram.
//!
//! diff = EMA(close, fast) - EMA(close, slow)
//! dea  = EMA(diff, signal)
//! hist = 2 * (diff - dea)

use super::ema::ema_of_series;

/// The three MACD lines, each the length of the input.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdLines {
    pub diff: Vec<f64>,
    pub dea: Vec<f64>,
    pub hist: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        Self { fast, slow, signal }
    }

    pub fn lines(&self, closes: &[f64]) -> MacdLines {
        let fast = ema_of_series(closes, self.fast);
        let slow = ema_of_series(closes, self.slow);
        let diff: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let dea = ema_of_series(&diff, self.signal);
        let hist = diff.iter().zip(&dea).map(|(d, e)| 2.0 * (d - e)).collect();
        MacdLines { diff, dea, hist }
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new(12, 26, 9)
    }
}
