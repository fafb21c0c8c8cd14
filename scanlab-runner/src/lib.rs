//! ScanLab Runner: scan orchestration, ticker inspection, reports, synthetic data.
//!
//! This crate builds on `scanlab-core` to provide:
//! - Universe loading from a price store with dataset fingerprinting
//! - The end-to-end scan (compute, screen, rank, export)
//! - Single-ticker inspection reports
//! - Result tables and CSV export
//! - Deterministic synthetic universes for demos and offline testing

pub mod data_loader;
pub mod inspect;
pub mod report;
pub mod runner;

pub use data_loader::{
    compute_dataset_hash, generate_synthetic_bars, generate_synthetic_universe, load_universe,
    LoadedUniverse, SyntheticSpec,
};
pub use inspect::{inspect_series, inspect_ticker, CriterionCheck, Inspection};
pub use report::{export_csv, export_summary_json, format_summary, format_table, write_csv};
pub use runner::{run_scan, scan_universe, ScanError, ScanOptions, ScanOutput, ScanSummary};
