//! Parquet price store with Hive-style partitioning.
//!
//! Layout: `{root}/ticker={TICKER}/{year}.parquet`, plus `{root}/profiles.toml`.
//!
//! Features:
//! - Atomic writes (write to .tmp, rename into place)
//! - Integrity validation on load (schema check, row count > 0, OHLC sanity)
//! - Loads are read-only and fail on the first unreadable file
//! - `repair()` quarantines corrupt files ({filename}.quarantined)
//! - Metadata sidecar per ticker (hash, date range, bar count)

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::profiles::ProfileRegistry;
use super::store::{PriceStore, StoreError};
use crate::domain::{PriceBar, TickerProfile};

const TICKER_DIR_PREFIX: &str = "ticker=";
const PROFILES_FILE: &str = "profiles.toml";
const EXPECTED_COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

/// Metadata sidecar for a stored ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerMeta {
    pub ticker: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub bar_count: usize,
    pub data_hash: String,
    pub written_at: chrono::NaiveDateTime,
}

/// Stored state of a single ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerStatus {
    pub ticker: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub bar_count: Option<usize>,
}

pub struct ParquetStore {
    root: PathBuf,
}

impl ParquetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `{root}/ticker={TICKER}/`
    fn ticker_dir(&self, ticker: &str) -> PathBuf {
        self.root.join(format!("{TICKER_DIR_PREFIX}{ticker}"))
    }

    fn year_path(&self, ticker: &str, year: i32) -> PathBuf {
        self.ticker_dir(ticker).join(format!("{year}.parquet"))
    }

    fn meta_path(&self, ticker: &str) -> PathBuf {
        self.ticker_dir(ticker).join("meta.json")
    }

    fn profiles_path(&self) -> PathBuf {
        self.root.join(PROFILES_FILE)
    }

    /// Replace the stored history of `ticker` with `bars`.
    ///
    /// One Parquet file per calendar year; year files not covered by `bars`
    /// are removed.
    pub fn write_bars(&self, ticker: &str, bars: &[PriceBar]) -> Result<(), StoreError> {
        if bars.is_empty() {
            return Err(StoreError::Validation(format!("no bars to store for {ticker}")));
        }
        if let Some(stray) = bars.iter().find(|b| b.ticker != ticker) {
            return Err(StoreError::Validation(format!(
                "bar for '{}' passed to write_bars('{ticker}')",
                stray.ticker
            )));
        }
        if let Some(bad) = bars.iter().find(|b| !b.is_void() && !b.is_sane()) {
            return Err(StoreError::Validation(format!(
                "{ticker} {}: inconsistent OHLC bar",
                bad.date
            )));
        }

        let dir = self.ticker_dir(ticker);
        fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;

        let mut sorted: Vec<&PriceBar> = bars.iter().collect();
        sorted.sort_by_key(|b| b.date);

        let mut by_year: BTreeMap<i32, Vec<&PriceBar>> = BTreeMap::new();
        for bar in &sorted {
            by_year.entry(bar.date.year()).or_default().push(bar);
        }

        for (year, year_bars) in &by_year {
            let df = bars_to_dataframe(year_bars)?;
            let path = self.year_path(ticker, *year);
            let tmp_path = path.with_extension("parquet.tmp");

            write_parquet(&df, &tmp_path)?;
            fs::rename(&tmp_path, &path).map_err(|e| {
                let _ = fs::remove_file(&tmp_path);
                io_error(&path, e)
            })?;
        }

        self.remove_stale_years(ticker, &by_year.keys().copied().collect())?;

        let (first, last) = match (sorted.first(), sorted.last()) {
            (Some(first), Some(last)) => (first.date, last.date),
            _ => return Err(StoreError::Validation("no bars to store".into())),
        };
        let meta = TickerMeta {
            ticker: ticker.to_string(),
            start_date: first,
            end_date: last,
            bar_count: sorted.len(),
            data_hash: hash_bars(&sorted)?,
            written_at: chrono::Local::now().naive_local(),
        };
        let meta_json = serde_json::to_string_pretty(&meta)
            .map_err(|e| StoreError::Serialization(format!("meta: {e}")))?;
        let meta_path = self.meta_path(ticker);
        fs::write(&meta_path, meta_json).map_err(|e| io_error(&meta_path, e))?;

        debug!(ticker, bars = sorted.len(), years = by_year.len(), "stored bars");
        Ok(())
    }

    fn remove_stale_years(&self, ticker: &str, keep: &BTreeSet<i32>) -> Result<(), StoreError> {
        let dir = self.ticker_dir(ticker);
        for entry in fs::read_dir(&dir).map_err(|e| io_error(&dir, e))? {
            let path = entry.map_err(|e| io_error(&dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("parquet") {
                continue;
            }
            let year = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<i32>().ok());
            if matches!(year, Some(y) if !keep.contains(&y)) {
                fs::remove_file(&path).map_err(|e| io_error(&path, e))?;
            }
        }
        Ok(())
    }

    /// Load all stored bars for a ticker, sorted by date ascending.
    ///
    /// Any unreadable year file fails the whole load; the store is not
    /// modified. Run `repair()` to quarantine corrupt files.
    pub fn load_ticker(&self, ticker: &str) -> Result<Vec<PriceBar>, StoreError> {
        let mut bars = Vec::new();
        for path in self.year_files(ticker)? {
            let year_bars = load_and_validate_parquet(&path, ticker).map_err(|e| match e {
                StoreError::Parquet(reason) => {
                    StoreError::Parquet(format!("{}: {reason}", path.display()))
                }
                StoreError::Validation(reason) => {
                    StoreError::Validation(format!("{}: {reason}", path.display()))
                }
                other => other,
            })?;
            bars.extend(year_bars);
        }

        if bars.is_empty() {
            return Err(StoreError::NoData {
                ticker: ticker.to_string(),
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    /// Year files of a ticker partition. Skips meta.json, quarantined
    /// files and leftover .tmp files.
    fn year_files(&self, ticker: &str) -> Result<Vec<PathBuf>, StoreError> {
        let dir = self.ticker_dir(ticker);
        if !dir.exists() {
            return Err(StoreError::NoData {
                ticker: ticker.to_string(),
            });
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| io_error(&dir, e))? {
            let path = entry.map_err(|e| io_error(&dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("parquet") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Move every unreadable year file aside as `{file}.quarantined`.
    ///
    /// Returns the quarantined paths. Tickers left with no readable file
    /// will fail the next load until they are re-ingested.
    pub fn repair(&self) -> Result<Vec<PathBuf>, StoreError> {
        let mut quarantined = Vec::new();
        for ticker in self.tickers()? {
            for path in self.year_files(&ticker)? {
                if let Err(e) = load_and_validate_parquet(&path, &ticker) {
                    let target = path.with_extension("parquet.quarantined");
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "quarantining corrupt parquet file"
                    );
                    fs::rename(&path, &target).map_err(|e| io_error(&path, e))?;
                    quarantined.push(target);
                }
            }
        }
        Ok(quarantined)
    }

    /// Tickers with a partition directory, in ascending order.
    pub fn tickers(&self) -> Result<Vec<String>, StoreError> {
        if !self.root.is_dir() {
            return Err(StoreError::MissingRoot(self.root.display().to_string()));
        }

        let mut tickers = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(|e| io_error(&self.root, e))? {
            let entry = entry.map_err(|e| io_error(&self.root, e))?;
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name();
            if let Some(ticker) = name.to_str().and_then(|n| n.strip_prefix(TICKER_DIR_PREFIX)) {
                tickers.push(ticker.to_string());
            }
        }
        tickers.sort();
        Ok(tickers)
    }

    pub fn get_meta(&self, ticker: &str) -> Option<TickerMeta> {
        let content = fs::read_to_string(self.meta_path(ticker)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Date range and bar count of every stored ticker, from the sidecars.
    pub fn status(&self) -> Result<Vec<TickerStatus>, StoreError> {
        Ok(self
            .tickers()?
            .into_iter()
            .map(|ticker| {
                let meta = self.get_meta(&ticker);
                TickerStatus {
                    start_date: meta.as_ref().map(|m| m.start_date),
                    end_date: meta.as_ref().map(|m| m.end_date),
                    bar_count: meta.as_ref().map(|m| m.bar_count),
                    ticker,
                }
            })
            .collect())
    }

    /// Replace the profile registry.
    pub fn write_profiles(&self, profiles: &[TickerProfile]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).map_err(|e| io_error(&self.root, e))?;

        let text = ProfileRegistry::new(profiles.to_vec()).to_toml()?;
        let path = self.profiles_path();
        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, text).map_err(|e| io_error(&tmp_path, e))?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            io_error(&path, e)
        })
    }
}

impl PriceStore for ParquetStore {
    fn load_all_bars(&self) -> Result<Vec<PriceBar>, StoreError> {
        let mut all = Vec::new();
        for ticker in self.tickers()? {
            all.extend(self.load_ticker(&ticker)?);
        }
        Ok(all)
    }

    fn load_all_profiles(&self) -> Result<Vec<TickerProfile>, StoreError> {
        if !self.root.is_dir() {
            return Err(StoreError::MissingRoot(self.root.display().to_string()));
        }
        let path = self.profiles_path();
        if !path.exists() {
            warn!(path = %path.display(), "no profile registry, every ticker will be skipped");
            return Ok(Vec::new());
        }
        Ok(ProfileRegistry::from_file(&path)?.tickers)
    }
}

fn io_error(path: &Path, e: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

fn hash_bars(bars: &[&PriceBar]) -> Result<String, StoreError> {
    let bytes =
        serde_json::to_vec(bars).map_err(|e| StoreError::Serialization(format!("hash: {e}")))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

// ── Parquet I/O helpers ─────────────────────────────────────────────

fn epoch() -> NaiveDate {
    // NaiveDate's default is 1970-01-01.
    NaiveDate::default()
}

fn bars_to_dataframe(bars: &[&PriceBar]) -> Result<DataFrame, StoreError> {
    let dates: Vec<i32> = bars
        .iter()
        .map(|b| (b.date - epoch()).num_days() as i32)
        .collect();
    let opens: Vec<f64> = bars.iter().map(|b| b.open).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<u64> = bars.iter().map(|b| b.volume).collect();

    DataFrame::new(vec![
        Column::new("date".into(), dates)
            .cast(&DataType::Date)
            .map_err(|e| StoreError::Parquet(format!("date cast: {e}")))?,
        Column::new("open".into(), opens),
        Column::new("high".into(), highs),
        Column::new("low".into(), lows),
        Column::new("close".into(), closes),
        Column::new("volume".into(), volumes),
    ])
    .map_err(|e| StoreError::Parquet(format!("dataframe creation: {e}")))
}

fn write_parquet(df: &DataFrame, path: &Path) -> Result<(), StoreError> {
    let file = fs::File::create(path).map_err(|e| io_error(path, e))?;
    ParquetWriter::new(file)
        .finish(&mut df.clone())
        .map_err(|e| StoreError::Parquet(format!("write {}: {e}", path.display())))?;
    Ok(())
}

fn load_and_validate_parquet(path: &Path, ticker: &str) -> Result<Vec<PriceBar>, StoreError> {
    let file = fs::File::open(path).map_err(|e| io_error(path, e))?;
    let df = ParquetReader::new(file)
        .finish()
        .map_err(|e| StoreError::Parquet(format!("read: {e}")))?;

    if df.height() == 0 {
        return Err(StoreError::Validation("empty parquet file".into()));
    }
    for col_name in EXPECTED_COLUMNS {
        if df.column(col_name).is_err() {
            return Err(StoreError::Validation(format!(
                "missing column '{col_name}'"
            )));
        }
    }

    dataframe_to_bars(&df, ticker)
}

/// Null prices read back as NaN (a void bar); null volume as zero.
/// A non-void bar failing the OHLC sanity check rejects the file.
fn dataframe_to_bars(df: &DataFrame, ticker: &str) -> Result<Vec<PriceBar>, StoreError> {
    let column = |name: &str| {
        df.column(name)
            .map_err(|e| StoreError::Parquet(format!("column read: {e}")))
    };
    let type_err = |name: &'static str| {
        move |e: PolarsError| StoreError::Parquet(format!("{name} column type: {e}"))
    };

    let date_ca = column("date")?.date().map_err(type_err("date"))?;
    let open_ca = column("open")?.f64().map_err(type_err("open"))?;
    let high_ca = column("high")?.f64().map_err(type_err("high"))?;
    let low_ca = column("low")?.f64().map_err(type_err("low"))?;
    let close_ca = column("close")?.f64().map_err(type_err("close"))?;
    let vol_ca = column("volume")?.u64().map_err(type_err("volume"))?;

    let n = df.height();
    let mut bars = Vec::with_capacity(n);
    for i in 0..n {
        let date_days = date_ca
            .get(i)
            .ok_or_else(|| StoreError::Validation(format!("null date at row {i}")))?;

        let bar = PriceBar {
            ticker: ticker.to_string(),
            date: epoch() + chrono::Duration::days(date_days as i64),
            open: open_ca.get(i).unwrap_or(f64::NAN),
            high: high_ca.get(i).unwrap_or(f64::NAN),
            low: low_ca.get(i).unwrap_or(f64::NAN),
            close: close_ca.get(i).unwrap_or(f64::NAN),
            volume: vol_ca.get(i).unwrap_or(0),
        };
        if !bar.is_void() && !bar.is_sane() {
            return Err(StoreError::Validation(format!(
                "inconsistent OHLC bar on {}",
                bar.date
            )));
        }
        bars.push(bar);
    }

    Ok(bars)
}
