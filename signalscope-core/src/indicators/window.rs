//! Variable-window helpers over numeric and boolean series.
//!
//! These are the building blocks of the divergence triggers: crossings of a
//! zero line, bars elapsed since an event, extremes over a per-bar window and
//! lagged references. None of them read past the current index.

/// `true` at `i` when the series crosses from `>= 0` to `< 0`.
pub fn cross_below_zero(values: &[f64]) -> Vec<bool> {
    crossings(values, |prev, cur| prev >= 0.0 && cur < 0.0)
}

/// `true` at `i` when the series crosses from `<= 0` to `> 0`.
pub fn cross_above_zero(values: &[f64]) -> Vec<bool> {
    crossings(values, |prev, cur| prev <= 0.0 && cur > 0.0)
}

fn crossings(values: &[f64], hit: impl Fn(f64, f64) -> bool) -> Vec<bool> {
    let mut out = vec![false; values.len()];
    for i in 1..values.len() {
        out[i] = hit(values[i - 1], values[i]);
    }
    out
}

/// Bars since the most recent `true`, or 0 before the first one.
pub fn bars_since(events: &[bool]) -> Vec<usize> {
    let mut last = None;
    events
        .iter()
        .enumerate()
        .map(|(i, &hit)| {
            if hit {
                last = Some(i);
            }
            last.map_or(0, |l| i - l)
        })
        .collect()
}

/// Lowest value over the last `windows[i]` bars ending at `i`.
///
/// The window clamps at the start of the series and skips NaN; a window of
/// zero or an all-NaN window yields NaN.
pub fn lowest_over(values: &[f64], windows: &[usize]) -> Vec<f64> {
    extreme_over(values, windows, f64::min)
}

/// Highest value over the last `windows[i]` bars ending at `i`.
pub fn highest_over(values: &[f64], windows: &[usize]) -> Vec<f64> {
    extreme_over(values, windows, f64::max)
}

fn extreme_over(values: &[f64], windows: &[usize], pick: fn(f64, f64) -> f64) -> Vec<f64> {
    values
        .iter()
        .enumerate()
        .map(|(i, _)| {
            let window = windows.get(i).copied().unwrap_or(0);
            if window == 0 {
                return f64::NAN;
            }
            let start = (i + 1).saturating_sub(window);
            values[start..=i]
                .iter()
                .copied()
                .filter(|v| !v.is_nan())
                .reduce(pick)
                .unwrap_or(f64::NAN)
        })
        .collect()
}

/// `values[i - lags[i]]`, or NaN when the lag reaches before the series.
pub fn lagged(values: &[f64], lags: &[usize]) -> Vec<f64> {
    (0..values.len())
        .map(|i| match lags.get(i) {
            Some(&lag) if lag <= i => values[i - lag],
            _ => f64::NAN,
        })
        .collect()
}
