//! Scan configuration.
//!
//! A `ScanConfig` is an explicit value handed to each component at
//! construction. Sections mirror the component boundaries:
//!
//! ```toml
//! [indicators]
//! avg_volume_window = 20
//! volume_mode = "average"      # or "current_day"
//! adr_window = 20
//! ma_window = 200
//! gain_windows = { one_month = 21, three_month = 63, six_month = 126 }
//!
//! [screening]
//! min_dollar_volume = 3000000.0
//! min_adr_percent = 8.0
//! min_close_price = 3.0
//! use_ma_filter = true
//! excluded_sectors = []
//! excluded_industries = ["Biotechnology"]
//!
//! [ranking]
//! percentiles = { one_month = 0.6, three_month = 0.6, six_month = 0.6 }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

use crate::domain::{Horizon, HorizonSet};

/// Errors from loading or validating a config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("parse config TOML: {0}")]
    Parse(String),

    #[error("{field} must be >= 1")]
    ZeroWindow { field: String },

    #[error("{field} must be within [0, 1], got {value}")]
    PercentileOutOfRange { field: String, value: f64 },

    #[error("{field} must be finite and >= 0, got {value}")]
    InvalidThreshold { field: String, value: f64 },
}

/// How the dollar-volume liquidity figure is averaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeMode {
    /// Trailing mean over `avg_volume_window` bars.
    #[default]
    Average,
    /// Same-day dollar volume only (1-bar window).
    CurrentDay,
}

/// Rolling-window parameters for the indicator calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub avg_volume_window: usize,
    pub volume_mode: VolumeMode,
    pub adr_window: usize,
    pub ma_window: usize,
    pub gain_windows: HorizonSet<usize>,
}

impl IndicatorConfig {
    /// Window actually used for dollar volume, after applying `volume_mode`.
    pub fn effective_volume_window(&self) -> usize {
        match self.volume_mode {
            VolumeMode::Average => self.avg_volume_window,
            VolumeMode::CurrentDay => 1,
        }
    }

    /// Bars needed before every gain horizon carries a value.
    pub fn longest_gain_window(&self) -> usize {
        self.gain_windows
            .iter()
            .map(|(_, w)| *w)
            .max()
            .unwrap_or(1)
    }
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            avg_volume_window: 20,
            volume_mode: VolumeMode::Average,
            adr_window: 20,
            ma_window: 200,
            gain_windows: HorizonSet::new(21, 63, 126),
        }
    }
}

/// Thresholds and categorical policy for the screening filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningConfig {
    pub min_dollar_volume: f64,
    pub min_adr_percent: f64,
    pub min_close_price: f64,
    pub use_ma_filter: bool,
    pub excluded_sectors: BTreeSet<String>,
    pub excluded_industries: BTreeSet<String>,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            min_dollar_volume: 3_000_000.0,
            min_adr_percent: 8.0,
            min_close_price: 3.0,
            use_ma_filter: true,
            excluded_sectors: BTreeSet::new(),
            excluded_industries: ["Biotechnology".to_string()].into_iter().collect(),
        }
    }
}

/// Quantile levels for the percentile ranker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub percentiles: HorizonSet<f64>,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            percentiles: HorizonSet::new(0.60, 0.60, 0.60),
        }
    }
}

/// Complete configuration for one scan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub indicators: IndicatorConfig,
    pub screening: ScreeningConfig,
    pub ranking: RankingConfig,
}

impl ScanConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check windows, quantile levels, and thresholds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ind = &self.indicators;
        let mut windows = vec![
            ("indicators.avg_volume_window".to_string(), ind.avg_volume_window),
            ("indicators.adr_window".to_string(), ind.adr_window),
            ("indicators.ma_window".to_string(), ind.ma_window),
        ];
        for (h, w) in ind.gain_windows.iter() {
            windows.push((format!("indicators.gain_windows.{}", field_name(h)), *w));
        }
        for (field, w) in windows {
            if w == 0 {
                return Err(ConfigError::ZeroWindow { field });
            }
        }

        for (h, p) in self.ranking.percentiles.iter() {
            if !(0.0..=1.0).contains(p) {
                return Err(ConfigError::PercentileOutOfRange {
                    field: format!("ranking.percentiles.{}", field_name(h)),
                    value: *p,
                });
            }
        }

        let scr = &self.screening;
        for (field, value) in [
            ("screening.min_dollar_volume", scr.min_dollar_volume),
            ("screening.min_adr_percent", scr.min_adr_percent),
            ("screening.min_close_price", scr.min_close_price),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidThreshold {
                    field: field.to_string(),
                    value,
                });
            }
        }

        Ok(())
    }

    /// Deterministic BLAKE3 hash of the config, for comparing scans.
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&json).to_hex().to_string()
    }
}

fn field_name(h: Horizon) -> &'static str {
    match h {
        Horizon::OneMonth => "one_month",
        Horizon::ThreeMonth => "three_month",
        Horizon::SixMonth => "six_month",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = ScanConfig::from_toml("").unwrap();
        assert_eq!(config, ScanConfig::default());
        assert_eq!(config.indicators.gain_windows, HorizonSet::new(21, 63, 126));
        assert!(config.screening.excluded_industries.contains("Biotechnology"));
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = ScanConfig::from_toml(
            r#"
            [screening]
            min_close_price = 5.0
            use_ma_filter = false
            "#,
        )
        .unwrap();
        assert_eq!(config.screening.min_close_price, 5.0);
        assert!(!config.screening.use_ma_filter);
        assert_eq!(config.screening.min_adr_percent, 8.0);
        assert_eq!(config.indicators.ma_window, 200);
    }

    #[test]
    fn current_day_mode_forces_single_bar_window() {
        let config = ScanConfig::from_toml(
            r#"
            [indicators]
            volume_mode = "current_day"
            "#,
        )
        .unwrap();
        assert_eq!(config.indicators.avg_volume_window, 20);
        assert_eq!(config.indicators.effective_volume_window(), 1);
    }

    #[test]
    fn rejects_zero_window() {
        let err = ScanConfig::from_toml(
            r#"
            [indicators]
            gain_windows = { one_month = 0, three_month = 63, six_month = 126 }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroWindow { .. }));
        assert!(err.to_string().contains("one_month"));
    }

    #[test]
    fn rejects_percentile_above_one() {
        let err = ScanConfig::from_toml(
            r#"
            [ranking]
            percentiles = { one_month = 1.5, three_month = 0.6, six_month = 0.6 }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::PercentileOutOfRange { .. }));
    }

    #[test]
    fn rejects_negative_threshold() {
        let mut config = ScanConfig::default();
        config.screening.min_close_price = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThreshold { .. })
        ));
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = ScanConfig::default();
        config.screening.excluded_sectors.insert("Utilities".into());
        let text = config.to_toml().unwrap();
        assert_eq!(ScanConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn fingerprint_changes_with_params() {
        let a = ScanConfig::default();
        let mut b = a.clone();
        b.ranking.percentiles.one_month = 0.8;
        assert_eq!(a.fingerprint(), a.fingerprint());
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn longest_gain_window_ignores_ma_window() {
        assert_eq!(IndicatorConfig::default().longest_gain_window(), 126);
    }
}
