use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cli::Cli;
use crate::storage::Storage;

pub const DEFAULT_WATCHLIST: &str = "ticker_list.csv";
pub const DEFAULT_PRICES: &str = "ticker_prices.csv";
pub const DEFAULT_TOP_N: usize = 5;

/// Resolved run settings. Every field may be left out of `config.json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub watchlist: PathBuf,
    pub prices: PathBuf,
    pub top_n: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            watchlist: PathBuf::from(DEFAULT_WATCHLIST),
            prices: PathBuf::from(DEFAULT_PRICES),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl AppConfig {
    /// Defaults, overlaid by `config.json` in `storage` if present.
    pub fn load(storage: &Storage) -> anyhow::Result<Self> {
        match storage.load_optional::<AppConfig>("config")? {
            Some(config) => {
                tracing::info!(dir = %storage.base_dir.display(), "loaded config.json");
                Ok(config)
            }
            None => {
                tracing::debug!(dir = %storage.base_dir.display(), "no config.json, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Command-line values win over anything loaded from file.
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(watchlist) = &cli.watchlist {
            self.watchlist = watchlist.clone();
        }
        if let Some(prices) = &cli.prices {
            self.prices = prices.clone();
        }
        if let Some(top_n) = cli.top_n {
            self.top_n = top_n;
        }
        self
    }
}
