//! Price store trait and structured error types.
//!
//! The PriceStore trait abstracts over where bars and profiles live (Parquet
//! on disk, in memory) so the scan can swap implementations and mock for tests.

use thiserror::Error;

use crate::domain::{PriceBar, TickerProfile};

/// Structured error types for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store root not found: {0}")]
    MissingRoot(String),

    #[error("store I/O error at {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("parquet I/O error: {0}")]
    Parquet(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("profile registry error: {0}")]
    Profiles(String),

    #[error("no stored data for ticker '{ticker}'")]
    NoData { ticker: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Read access to the full daily history and the ticker profiles.
///
/// Bars come back in no particular order; consumers group and sort them.
pub trait PriceStore: Send + Sync {
    fn load_all_bars(&self) -> Result<Vec<PriceBar>, StoreError>;

    fn load_all_profiles(&self) -> Result<Vec<TickerProfile>, StoreError>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub bars: Vec<PriceBar>,
    pub profiles: Vec<TickerProfile>,
}

impl MemoryStore {
    pub fn new(bars: Vec<PriceBar>, profiles: Vec<TickerProfile>) -> Self {
        Self { bars, profiles }
    }
}

impl PriceStore for MemoryStore {
    fn load_all_bars(&self) -> Result<Vec<PriceBar>, StoreError> {
        Ok(self.bars.clone())
    }

    fn load_all_profiles(&self) -> Result<Vec<TickerProfile>, StoreError> {
        Ok(self.profiles.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn memory_store_returns_contents() {
        let bar = PriceBar {
            ticker: "AAA".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: 10.0,
            high: 11.0,
            low: 9.0,
            close: 10.5,
            volume: 100,
        };
        let store = MemoryStore::new(
            vec![bar.clone()],
            vec![TickerProfile::new("AAA", "NYSE", "Stock")],
        );
        assert_eq!(store.load_all_bars().unwrap(), vec![bar]);
        assert_eq!(store.load_all_profiles().unwrap()[0].ticker, "AAA");
    }

    #[test]
    fn store_is_object_safe() {
        let store: Box<dyn PriceStore> = Box::new(MemoryStore::default());
        assert!(store.load_all_bars().unwrap().is_empty());
    }
}
