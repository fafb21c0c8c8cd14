//! Watchlist export: a grouped ticker list for charting tools.
//!
//! Format: one flat line. Entries are `EXCHANGE:TICKER`, grouped by asset
//! class, each group prefixed with `###{asset_class}s`:
//!
//! ```text
//! ###Stocks,NASDAQ:X,NYSE:Z,###Funds,AMEX:Y
//! ```
//!
//! Groups appear in order of their first entry in the ranked result, and
//! entries keep their ranked order within a group.

pub mod sink;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ranking::RankedResult;

pub use sink::{FileSink, MemorySink, SinkError, WatchlistSink};

/// What an export did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub tickers_exported: usize,
    pub groups: usize,
    /// Where the watchlist went; `None` when nothing was written.
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WatchlistExporter;

impl WatchlistExporter {
    /// Render the watchlist line. Empty for an empty result.
    pub fn render(&self, result: &RankedResult) -> String {
        format_groups(&group_by_asset_class(result))
    }

    /// Render and hand the watchlist to `sink`.
    ///
    /// An empty result writes nothing and reports zero tickers exported.
    pub fn export(
        &self,
        result: &RankedResult,
        sink: &mut dyn WatchlistSink,
    ) -> Result<ExportSummary, SinkError> {
        if result.is_empty() {
            info!("no tickers to export");
            return Ok(ExportSummary::default());
        }

        let grouped = group_by_asset_class(result);
        let groups = grouped.len();
        let line = format_groups(&grouped);
        let location = sink.write_watchlist(&line)?;
        info!(tickers = result.len(), groups, location = %location, "watchlist exported");

        Ok(ExportSummary {
            tickers_exported: result.len(),
            groups,
            location: Some(location),
        })
    }
}

/// `(asset_class, symbols)` in order of first appearance.
fn group_by_asset_class(result: &RankedResult) -> Vec<(&str, Vec<String>)> {
    let mut groups: Vec<(&str, Vec<String>)> = Vec::new();
    for entry in &result.entries {
        let profile = &entry.snapshot.profile;
        let symbol = profile.qualified_symbol();
        match groups
            .iter_mut()
            .find(|(class, _)| *class == profile.asset_class)
        {
            Some((_, members)) => members.push(symbol),
            None => groups.push((profile.asset_class.as_str(), vec![symbol])),
        }
    }
    groups
}

fn format_groups(groups: &[(&str, Vec<String>)]) -> String {
    groups
        .iter()
        .map(|(class, members)| format!("###{class}s,{}", members.join(",")))
        .collect::<Vec<_>>()
        .join(",")
}
