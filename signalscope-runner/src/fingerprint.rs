//! Run fingerprint: BLAKE3 over the configuration and every loaded bar.
//!
//! Two runs with the same fingerprint saw the same parameters and the same
//! (truncated) data, so their output must be byte-identical.

use serde::{Deserialize, Serialize};

use signalscope_core::domain::BarSeries;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFingerprint {
    pub config_hash: String,
    pub data_hash: String,
}

/// Digest of one ticker's series, in the order given.
pub fn series_digest<'a>(series: impl IntoIterator<Item = &'a BarSeries>) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    for s in series {
        hasher.update(s.ticker.as_bytes());
        hasher.update(s.interval.label().as_bytes());
        hasher.update(&(s.bars.len() as u64).to_le_bytes());
        for bar in &s.bars {
            hasher.update(bar.timestamp.to_string().as_bytes());
            hasher.update(&bar.open.to_le_bytes());
            hasher.update(&bar.high.to_le_bytes());
            hasher.update(&bar.low.to_le_bytes());
            hasher.update(&bar.close.to_le_bytes());
            hasher.update(&bar.volume.to_le_bytes());
        }
    }
    hasher.finalize()
}

/// Combine per-ticker digests, independent of the order they arrive in.
pub fn dataset_hash<'a>(digests: impl IntoIterator<Item = (&'a str, &'a blake3::Hash)>) -> String {
    let mut sorted: Vec<(&str, &blake3::Hash)> = digests.into_iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let mut hasher = blake3::Hasher::new();
    for (ticker, digest) in sorted {
        hasher.update(ticker.as_bytes());
        hasher.update(digest.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
