//! Ticker profile registry stored as TOML.
//!
//! ```toml
//! [[tickers]]
//! ticker = "AAPL"
//! exchange = "NASDAQ"
//! asset_class = "Stock"
//! sector = "Technology"
//! industry = "Consumer Electronics"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use super::store::StoreError;
use crate::domain::TickerProfile;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRegistry {
    #[serde(default)]
    pub tickers: Vec<TickerProfile>,
}

impl ProfileRegistry {
    pub fn new(tickers: Vec<TickerProfile>) -> Self {
        Self { tickers }
    }

    pub fn from_file(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| StoreError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse and reject duplicate tickers.
    pub fn from_toml(content: &str) -> Result<Self, StoreError> {
        let registry: Self = toml::from_str(content)
            .map_err(|e| StoreError::Profiles(format!("parse profiles TOML: {e}")))?;

        let mut seen = BTreeSet::new();
        for profile in &registry.tickers {
            if !seen.insert(profile.ticker.as_str()) {
                return Err(StoreError::Profiles(format!(
                    "duplicate profile for ticker '{}'",
                    profile.ticker
                )));
            }
        }
        Ok(registry)
    }

    pub fn to_toml(&self) -> Result<String, StoreError> {
        toml::to_string_pretty(self)
            .map_err(|e| StoreError::Profiles(format!("serialize profiles: {e}")))
    }

    pub fn get(&self, ticker: &str) -> Option<&TickerProfile> {
        self.tickers.iter().find(|p| p.ticker == ticker)
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}
