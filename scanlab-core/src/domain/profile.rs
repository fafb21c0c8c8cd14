//! Static per-ticker metadata.

use serde::{Deserialize, Serialize};

/// Listing metadata for a ticker.
///
/// `sector` and `industry` are unset for new listings and for non-equity
/// instruments such as funds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerProfile {
    pub ticker: String,
    pub exchange: String,
    pub asset_class: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
}

impl TickerProfile {
    pub fn new(
        ticker: impl Into<String>,
        exchange: impl Into<String>,
        asset_class: impl Into<String>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            exchange: exchange.into(),
            asset_class: asset_class.into(),
            sector: None,
            industry: None,
        }
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    /// `EXCHANGE:TICKER`, the form charting tools accept.
    pub fn qualified_symbol(&self) -> String {
        format!("{}:{}", self.exchange, self.ticker)
    }
}
