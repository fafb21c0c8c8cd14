//! IndicatorCalculator: raw bars in, derived series out.
//!
//! Each ticker is computed independently from its own ordered history, so
//! the universe can be evaluated sequentially or across a rayon pool with
//! identical output.

use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

use super::adr::{daily_range_factor, Adr};
use super::dollar_volume::AvgDollarVolume;
use super::gain::TroughGain;
use super::sma::Sma;
use super::Indicator;
use crate::config::IndicatorConfig;
use crate::domain::{DerivedRow, DerivedSeries, HorizonSet, PriceBar};

/// Computes every screening metric for a ticker's history.
#[derive(Debug, Clone)]
pub struct IndicatorCalculator {
    ma: Sma,
    dollar_volume: AvgDollarVolume,
    adr: Adr,
    gains: HorizonSet<TroughGain>,
}

impl IndicatorCalculator {
    /// Build from config. Windows must be >= 1 (see `ScanConfig::validate`).
    pub fn new(config: &IndicatorConfig) -> Self {
        Self {
            ma: Sma::new(config.ma_window),
            dollar_volume: AvgDollarVolume::new(config.effective_volume_window()),
            adr: Adr::new(config.adr_window),
            gains: HorizonSet::from_fn(|h| TroughGain::new(*config.gain_windows.get(h))),
        }
    }

    /// All metrics in evaluation order.
    pub fn indicators(&self) -> Vec<&dyn Indicator> {
        vec![
            &self.ma,
            &self.dollar_volume,
            &self.adr,
            &self.gains.one_month,
            &self.gains.three_month,
            &self.gains.six_month,
        ]
    }

    /// Compute the derived series for one ticker.
    ///
    /// `bars` must belong to `ticker` and be sorted by date ascending.
    pub fn compute(&self, ticker: &str, bars: &[PriceBar]) -> DerivedSeries {
        let ma = self.ma.compute(bars);
        let dv = self.dollar_volume.compute(bars);
        let adr = self.adr.compute(bars);
        let gains = HorizonSet::from_fn(|h| self.gains.get(h).compute(bars));

        let rows = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| DerivedRow {
                date: bar.date,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
                dollar_volume: bar.dollar_volume(),
                daily_range_factor: daily_range_factor(bar),
                ma200: ma[i],
                avg_dollar_volume: dv[i],
                adr_percent: adr[i],
                gains: HorizonSet::from_fn(|h| gains.get(h)[i]),
            })
            .collect();

        DerivedSeries {
            ticker: ticker.to_string(),
            rows,
        }
    }

    /// Compute derived series for every ticker in `universe`.
    ///
    /// With `parallel` set, tickers are spread across the global rayon pool.
    /// Output is keyed by ticker and does not depend on evaluation order.
    pub fn compute_universe(
        &self,
        universe: &BTreeMap<String, Vec<PriceBar>>,
        parallel: bool,
    ) -> BTreeMap<String, DerivedSeries> {
        debug!(tickers = universe.len(), parallel, "computing derived series");
        if parallel {
            universe
                .par_iter()
                .map(|(ticker, bars)| (ticker.clone(), self.compute(ticker, bars)))
                .collect()
        } else {
            universe
                .iter()
                .map(|(ticker, bars)| (ticker.clone(), self.compute(ticker, bars)))
                .collect()
        }
    }
}

/// Partition a flat bar list into per-ticker, date-ordered histories.
///
/// A repeated `(ticker, date)` keeps the last occurrence.
pub fn group_by_ticker(bars: Vec<PriceBar>) -> BTreeMap<String, Vec<PriceBar>> {
    let mut grouped: BTreeMap<String, Vec<PriceBar>> = BTreeMap::new();
    for bar in bars {
        grouped.entry(bar.ticker.clone()).or_default().push(bar);
    }
    for history in grouped.values_mut() {
        // Stable sort keeps input order among equal dates; dedup then keeps the last.
        history.sort_by_key(|b| b.date);
        history.reverse();
        history.dedup_by_key(|b| b.date);
        history.reverse();
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VolumeMode;
    use crate::domain::Horizon;
    use crate::indicators::make_bars;
    use chrono::NaiveDate;

    fn small_config() -> IndicatorConfig {
        IndicatorConfig {
            avg_volume_window: 3,
            volume_mode: VolumeMode::Average,
            adr_window: 3,
            ma_window: 5,
            gain_windows: HorizonSet::new(2, 3, 4),
        }
    }

    #[test]
    fn series_has_one_row_per_bar() {
        let calc = IndicatorCalculator::new(&small_config());
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        let series = calc.compute("TEST", &bars);
        assert_eq!(series.len(), 6);
        assert_eq!(series.ticker, "TEST");
        assert_eq!(series.rows[5].close, 15.0);
    }

    #[test]
    fn short_history_leaves_metrics_undefined() {
        let calc = IndicatorCalculator::new(&small_config());
        let bars = make_bars(&[10.0, 11.0]);
        let row = calc.compute("TEST", &bars).rows[1].clone();
        assert!(row.ma200.is_none());
        assert!(row.avg_dollar_volume.is_none());
        assert!(row.adr_percent.is_none());
        assert!(row.gains.get(Horizon::OneMonth).is_some());
        assert!(row.gains.get(Horizon::ThreeMonth).is_none());
        assert!(row.gains.get(Horizon::SixMonth).is_none());
        assert!(row.dollar_volume > 0.0);
    }

    #[test]
    fn current_day_volume_is_defined_on_first_bar() {
        let mut config = small_config();
        config.volume_mode = VolumeMode::CurrentDay;
        let calc = IndicatorCalculator::new(&config);
        let bars = make_bars(&[10.0]);
        let row = &calc.compute("TEST", &bars).rows[0];
        assert_eq!(row.avg_dollar_volume, Some(10_000.0));
    }

    #[test]
    fn group_by_ticker_sorts_and_dedups() {
        let mut bars = make_bars(&[1.0, 2.0, 3.0]);
        bars.reverse();
        let mut dup = bars[0].clone();
        dup.close = 99.0;
        bars.push(dup);
        let mut other = make_bars(&[7.0]);
        other[0].ticker = "OTHER".into();
        bars.extend(other);

        let grouped = group_by_ticker(bars);
        assert_eq!(grouped.len(), 2);
        let test = &grouped["TEST"];
        assert_eq!(test.len(), 3);
        assert!(test.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(test[2].close, 99.0);
        assert_eq!(test[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[test]
    fn parallel_matches_sequential() {
        let calc = IndicatorCalculator::new(&small_config());
        let mut universe = BTreeMap::new();
        for (i, t) in ["AAA", "BBB", "CCC", "DDD"].iter().enumerate() {
            let closes: Vec<f64> = (0..30).map(|k| 10.0 + ((k * (i + 3)) % 7) as f64).collect();
            let mut bars = make_bars(&closes);
            for b in &mut bars {
                b.ticker = t.to_string();
            }
            universe.insert(t.to_string(), bars);
        }
        assert_eq!(
            calc.compute_universe(&universe, false),
            calc.compute_universe(&universe, true)
        );
    }
}
