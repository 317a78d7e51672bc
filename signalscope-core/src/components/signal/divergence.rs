//! MACD divergence trigger shared by the CD and MC strategies.
//!
//! Bottom divergence (CD), per bar `i`:
//!
//! - `n = bars_since(cross_down) + 1`, `m = bars_since(cross_up) + 1`
//! - `c1 = lowest(close, n)`, `c2 = c1[i - m]`, `c3 = c2[i - m]`
//! - `d1 = lowest(diff, n)`, `d2 = d1[i - m]`, `d3 = d2[i - m]`
//! - `a = c1 < c2 && d1 > d2`, `b = c1 < c3 && d1 < d2 && d1 > d3`, both also
//!   requiring `hist[i-1] < 0 && diff[i] < 0`
//! - momentum turns when `(a || b)[i-1] && |diff[i-1]| >= |diff[i]| * shrink`
//! - an event fires on the first bar of each turn
//!
//! Top divergence (MC) swaps the crossings, takes highs instead of lows and
//! flips every level comparison. NaN compares false throughout.

use crate::components::signal::DetectorConfig;
use crate::indicators::{
    bars_since, cross_above_zero, cross_below_zero, highest_over, lagged, lowest_over, Macd,
};

/// Which extreme the divergence is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Lower price lows with higher momentum lows.
    Bottom,
    /// Higher price highs with lower momentum highs.
    Top,
}

/// Per-bar divergence event flags over a close series.
pub fn divergence_flags(closes: &[f64], config: &DetectorConfig, polarity: Polarity) -> Vec<bool> {
    let len = closes.len();
    if len == 0 {
        return Vec::new();
    }

    let lines = Macd::new(config.fast_span, config.slow_span, config.signal_span).lines(closes);
    let (diff, hist) = (&lines.diff, &lines.hist);

    let down = cross_below_zero(hist);
    let up = cross_above_zero(hist);
    // The window opens at the crossing into the divergence zone; the lag steps
    // back over the previous opposite crossing.
    let (opens, steps) = match polarity {
        Polarity::Bottom => (&down, &up),
        Polarity::Top => (&up, &down),
    };
    let window: Vec<usize> = bars_since(opens).iter().map(|b| b + 1).collect();
    let lag: Vec<usize> = bars_since(steps).iter().map(|b| b + 1).collect();

    let extreme: fn(&[f64], &[usize]) -> Vec<f64> = match polarity {
        Polarity::Bottom => lowest_over,
        Polarity::Top => highest_over,
    };
    let c1 = extreme(closes, &window);
    let c2 = lagged(&c1, &lag);
    let c3 = lagged(&c2, &lag);
    let d1 = extreme(diff, &window);
    let d2 = lagged(&d1, &lag);
    let d3 = lagged(&d2, &lag);

    // `beyond(x, y)`: x is further into the divergence zone than y.
    let beyond = |x: f64, y: f64| match polarity {
        Polarity::Bottom => x < y,
        Polarity::Top => x > y,
    };
    let in_zone = |v: f64| match polarity {
        Polarity::Bottom => v < 0.0,
        Polarity::Top => v > 0.0,
    };

    let mut armed = vec![false; len];
    for i in 1..len {
        if !(in_zone(hist[i - 1]) && in_zone(diff[i])) {
            continue;
        }
        let a = beyond(c1[i], c2[i]) && beyond(d2[i], d1[i]);
        let b = beyond(c1[i], c3[i]) && beyond(d1[i], d2[i]) && beyond(d3[i], d1[i]);
        armed[i] = a || b;
    }

    let mut turn = vec![false; len];
    for i in 1..len {
        turn[i] = armed[i - 1] && diff[i - 1].abs() >= diff[i].abs() * config.shrink_factor;
    }

    let mut fired = vec![false; len];
    for i in 1..len {
        fired[i] = turn[i] && !turn[i - 1];
    }
    fired
}

#[cfg(test)]
mod tests {
    use super::*;

    /// LCG random walk of closes, floored at 10.
    fn walk(n: usize, seed: u64) -> Vec<f64> {
        let mut state = seed;
        let mut price = 100.0_f64;
        (0..n)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                price = (price + (((state >> 33) % 200) as f64 - 100.0) * 0.05).max(10.0);
                price
            })
            .collect()
    }

    fn hits(flags: &[bool]) -> Vec<usize> {
        flags.iter().enumerate().filter(|(_, &f)| f).map(|(i, _)| i).collect()
    }

    #[test]
    fn empty_input_yields_no_flags() {
        assert!(divergence_flags(&[], &DetectorConfig::default(), Polarity::Bottom).is_empty());
    }

    #[test]
    fn flat_series_never_fires() {
        let closes = vec![42.0; 120];
        for polarity in [Polarity::Bottom, Polarity::Top] {
            let flags = divergence_flags(&closes, &DetectorConfig::default(), polarity);
            assert_eq!(flags.len(), 120);
            assert!(flags.iter().all(|&f| !f));
        }
    }

    #[test]
    fn monotonic_rise_never_bottoms() {
        let closes: Vec<f64> = (0..150).map(|i| 50.0 + i as f64 * 0.5).collect();
        let flags = divergence_flags(&closes, &DetectorConfig::default(), Polarity::Bottom);
        assert!(flags.iter().all(|&f| !f));
    }

    #[test]
    fn events_are_never_consecutive() {
        let closes = walk(300, 3);
        let flags = divergence_flags(&closes, &DetectorConfig::default(), Polarity::Bottom);
        assert_eq!(hits(&flags), vec![262, 268, 270, 272, 274, 276, 291]);
        for pair in flags.windows(2) {
            assert!(!(pair[0] && pair[1]));
        }
    }

    #[test]
    fn mirrored_series_swaps_polarity() {
        let closes = walk(300, 4);
        let mirrored: Vec<f64> = closes.iter().map(|c| 300.0 - c).collect();
        let config = DetectorConfig::default();
        assert_eq!(
            divergence_flags(&closes, &config, Polarity::Bottom),
            divergence_flags(&mirrored, &config, Polarity::Top)
        );
        assert_eq!(
            hits(&divergence_flags(&closes[..120], &config, Polarity::Top)),
            vec![43]
        );
    }

    #[test]
    fn flags_are_causal() {
        let closes = walk(300, 2);
        let config = DetectorConfig::default();
        let full = divergence_flags(&closes, &config, Polarity::Bottom);
        for cut in [40, 100, 180, 212] {
            let partial = divergence_flags(&closes[..cut], &config, Polarity::Bottom);
            assert_eq!(partial[..], full[..cut]);
        }
    }
}
