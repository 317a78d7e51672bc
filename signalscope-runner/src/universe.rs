//! Ticker universe: a plain list file or sector-organized TOML.
//!
//! Plain lists carry one ticker per line; only the first tab-separated column
//! is read, blank lines and `#` comments are skipped. TOML files map sector
//! names to ticker arrays:
//!
//! ```toml
//! [sectors]
//! Technology = ["AAPL", "MSFT"]
//! ETFs = ["SPY"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Sector name used for tickers loaded from a plain list.
pub const UNSORTED_SECTOR: &str = "Unsorted";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UniverseError {
    #[error("read universe file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("parse universe TOML: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub sectors: BTreeMap<String, Vec<String>>,
}

impl Universe {
    /// Load a `.toml` sector file, or any other file as a plain list.
    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let content = std::fs::read_to_string(path).map_err(|e| UniverseError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("toml")) {
            Self::from_toml(&content)
        } else {
            Ok(Self::from_list(&content))
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        toml::from_str(content).map_err(|e| UniverseError::Parse(e.to_string()))
    }

    pub fn from_list(content: &str) -> Self {
        let tickers = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split('\t').next())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        Self::from_tickers(tickers)
    }

    pub fn from_tickers(tickers: Vec<String>) -> Self {
        let mut sectors = BTreeMap::new();
        if !tickers.is_empty() {
            sectors.insert(UNSORTED_SECTOR.to_string(), tickers);
        }
        Self { sectors }
    }

    /// All tickers across sectors, sorted and deduplicated.
    pub fn all_tickers(&self) -> Vec<String> {
        let mut all: Vec<String> = self.sectors.values().flatten().cloned().collect();
        all.sort();
        all.dedup();
        all
    }

    pub fn sector_tickers(&self, sector: &str) -> Option<&[String]> {
        self.sectors.get(sector).map(|v| v.as_slice())
    }

    pub fn sector_names(&self) -> Vec<&str> {
        self.sectors.keys().map(|s| s.as_str()).collect()
    }

    pub fn ticker_count(&self) -> usize {
        self.all_tickers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.values().all(|v| v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_list_reads_first_column() {
        let u = Universe::from_list("# index members\nAAPL\tApple Inc.\n\nMSFT\n  NVDA \t x\n");
        assert_eq!(u.all_tickers(), vec!["AAPL", "MSFT", "NVDA"]);
        assert_eq!(u.sector_names(), vec![UNSORTED_SECTOR]);
    }

    #[test]
    fn toml_sectors_flatten_sorted_and_unique() {
        let u = Universe::from_toml(
            r#"
            [sectors]
            Technology = ["MSFT", "AAPL"]
            ETFs = ["SPY", "AAPL"]
            "#,
        )
        .unwrap();
        assert_eq!(u.all_tickers(), vec!["AAPL", "MSFT", "SPY"]);
        assert_eq!(u.ticker_count(), 3);
        assert_eq!(u.sector_tickers("ETFs").unwrap().len(), 2);
    }

    #[test]
    fn bad_toml_is_parse_error() {
        assert!(matches!(
            Universe::from_toml("sectors = 5"),
            Err(UniverseError::Parse(_))
        ));
    }

    #[test]
    fn empty_list_is_empty_universe() {
        let u = Universe::from_list("# nothing\n\n");
        assert!(u.is_empty());
        assert!(u.all_tickers().is_empty());
    }

    #[test]
    fn file_extension_selects_format() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("tickers.txt");
        std::fs::write(&list, "SPY\nQQQ\n").unwrap();
        let toml_path = dir.path().join("universe.toml");
        std::fs::write(&toml_path, "[sectors]\nETFs = [\"IWM\"]\n").unwrap();

        assert_eq!(Universe::from_file(&list).unwrap().all_tickers(), vec!["QQQ", "SPY"]);
        assert_eq!(Universe::from_file(&toml_path).unwrap().all_tickers(), vec!["IWM"]);
        assert!(matches!(
            Universe::from_file(&dir.path().join("missing.txt")),
            Err(UniverseError::Io { .. })
        ));
    }
}
