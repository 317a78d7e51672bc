//! Upper channel breakthrough: close crosses above the EMA of highs.

use super::ema::Ema;
use crate::components::indicator::{Field, Indicator};
use crate::domain::Bar;

/// `true` at `i` when `close[i] > upper[i]` and `close[i-1] <= upper[i-1]`,
/// where `upper = EMA(high, span)`.
pub fn breakthroughs(bars: &[Bar], span: usize) -> Vec<bool> {
    let upper = Ema::of(Field::High, span).compute(bars);
    let mut out = vec![false; bars.len()];
    for i in 1..bars.len() {
        out[i] = bars[i].close > upper[i] && bars[i - 1].close <= upper[i - 1];
    }
    out
}

/// First breakthrough index at or after `from`.
pub fn first_breakthrough_from(flags: &[bool], from: usize) -> Option<usize> {
    flags
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, &hit)| hit)
        .map(|(i, _)| i)
}
