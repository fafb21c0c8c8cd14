//! ScanLab Core: domain types, indicators, screening, ranking, watchlist export.
//!
//! This crate contains the screening pipeline:
//! - Domain types (price bars, ticker profiles, derived series, snapshots)
//! - Trailing-window indicators (dollar volume, ADR, trough gains, moving average)
//! - Screening rules (hard thresholds, category exclusions, trend filter)
//! - Percentile ranking across the 1/3/6-month horizons
//! - Grouped watchlist export
//! - Price store seam with a Parquet implementation

pub mod config;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod ranking;
pub mod screening;
pub mod watchlist;

pub use config::{ConfigError, ScanConfig};
