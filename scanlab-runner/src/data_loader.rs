//! Universe loading and synthetic data for the runner.
//!
//! Loads every bar and profile from a `PriceStore` once, groups bars into
//! per-ticker date-ordered histories, and fingerprints the dataset.
//!
//! Synthetic data is a developer-only mode for demos and offline testing:
//! a deterministic random walk per ticker, seeded from the ticker name.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use scanlab_core::data::{PriceStore, StoreError};
use scanlab_core::domain::{PriceBar, TickerProfile};
use scanlab_core::indicators::group_by_ticker;

/// Everything a scan reads from the store.
#[derive(Debug, Clone, Default)]
pub struct LoadedUniverse {
    /// Date-ordered history per ticker.
    pub histories: BTreeMap<String, Vec<PriceBar>>,
    pub profiles: Vec<TickerProfile>,
    /// BLAKE3 over all bar data in ticker order.
    pub dataset_hash: String,
    pub bar_count: usize,
}

/// Load the full universe. Any store failure aborts the load.
pub fn load_universe(store: &dyn PriceStore) -> Result<LoadedUniverse, StoreError> {
    let bars = store.load_all_bars()?;
    let profiles = store.load_all_profiles()?;

    let histories = group_by_ticker(bars);
    // Counted after duplicate (ticker, date) rows are collapsed.
    let bar_count = histories.values().map(Vec::len).sum();
    let dataset_hash = compute_dataset_hash(&histories);

    info!(
        tickers = histories.len(),
        bars = bar_count,
        profiles = profiles.len(),
        "universe loaded"
    );

    Ok(LoadedUniverse {
        histories,
        profiles,
        dataset_hash,
        bar_count,
    })
}

/// Deterministic BLAKE3 hash over all bar data.
///
/// Covers ticker, date and OHLCV in ticker then date order, so the hash
/// is independent of the order the store returned bars in.
pub fn compute_dataset_hash(histories: &BTreeMap<String, Vec<PriceBar>>) -> String {
    let mut hasher = blake3::Hasher::new();
    for (ticker, bars) in histories {
        hasher.update(ticker.as_bytes());
        for bar in bars {
            hasher.update(bar.date.to_string().as_bytes());
            hasher.update(&bar.open.to_le_bytes());
            hasher.update(&bar.high.to_le_bytes());
            hasher.update(&bar.low.to_le_bytes());
            hasher.update(&bar.close.to_le_bytes());
            hasher.update(&bar.volume.to_le_bytes());
        }
    }
    hasher.finalize().to_hex().to_string()
}

/// Shape of a synthetic universe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticSpec {
    pub tickers: usize,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

const SYNTHETIC_SECTORS: [(&str, &str); 5] = [
    ("Technology", "Semiconductors"),
    ("Healthcare", "Biotechnology"),
    ("Energy", "Oil & Gas"),
    ("Financials", "Banks"),
    ("Industrials", "Machinery"),
];

/// Generate a synthetic universe: `SYN001`, `SYN002`, ...
///
/// Every fifth ticker is a Fund on AMEX; the rest are Stocks on NASDAQ or
/// NYSE with rotating sectors.
pub fn generate_synthetic_universe(spec: &SyntheticSpec) -> (Vec<PriceBar>, Vec<TickerProfile>) {
    let mut bars = Vec::new();
    let mut profiles = Vec::with_capacity(spec.tickers);

    for i in 0..spec.tickers {
        let ticker = format!("SYN{:03}", i + 1);
        let profile = if i % 5 == 4 {
            TickerProfile::new(ticker.as_str(), "AMEX", "Fund")
        } else {
            let (sector, industry) = SYNTHETIC_SECTORS[i % SYNTHETIC_SECTORS.len()];
            let exchange = if i % 2 == 0 { "NASDAQ" } else { "NYSE" };
            TickerProfile::new(ticker.as_str(), exchange, "Stock")
                .with_sector(sector)
                .with_industry(industry)
        };
        bars.extend(generate_synthetic_bars(&ticker, spec.start, spec.end));
        profiles.push(profile);
    }

    (bars, profiles)
}

/// Deterministic random walk on weekdays between `start` and `end`.
///
/// Starting price, volatility and volume scale are drawn per ticker, so a
/// universe contains both liquid high-range names and quiet ones.
pub fn generate_synthetic_bars(ticker: &str, start: NaiveDate, end: NaiveDate) -> Vec<PriceBar> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    // Deterministic seed from ticker name
    let seed: [u8; 32] = *blake3::hash(ticker.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut price: f64 = rng.gen_range(2.0..80.0);
    let volatility: f64 = rng.gen_range(0.01..0.06);
    let drift: f64 = rng.gen_range(-0.002..0.004);
    let volume_scale: u64 = rng.gen_range(20_000..400_000);

    let mut bars = Vec::new();
    let mut current = start;
    while current <= end {
        let weekday = current.weekday();
        if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = drift + rng.gen_range(-volatility..volatility);
        let open = price;
        let close = (price * (1.0 + daily_return)).max(0.5);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..volatility));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..volatility));
        let volume = volume_scale * rng.gen_range(1..10u64);

        bars.push(PriceBar {
            ticker: ticker.to_string(),
            date: current,
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        current += chrono::Duration::days(1);
    }

    bars
}
