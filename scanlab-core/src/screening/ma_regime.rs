//! Long-term trend filter.
//!
//! Passes when close is at or above the long moving average. Tickers whose
//! average is undefined (too little history) are exempt and always pass, so
//! new issues are never dropped by this stage.

use super::{ScreenRule, ScreenStage, Verdict};
use crate::domain::Snapshot;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrendFilter;

impl ScreenRule for TrendFilter {
    fn name(&self) -> &str {
        "ma_trend"
    }

    fn stage(&self) -> ScreenStage {
        ScreenStage::Trend
    }

    fn evaluate(&self, snapshot: &Snapshot) -> Verdict {
        match snapshot.ma200 {
            None => Verdict::Passed,
            Some(ma) if snapshot.close >= ma => Verdict::Passed,
            Some(_) => Verdict::BelowTrend,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::test_support::passing_snapshot;

    #[test]
    fn passes_when_close_above_ma() {
        let snap = passing_snapshot("A"); // close 50, ma 45
        assert!(TrendFilter.evaluate(&snap).is_passed());
    }

    #[test]
    fn passes_when_close_equals_ma() {
        let mut snap = passing_snapshot("A");
        snap.ma200 = Some(50.0);
        assert!(TrendFilter.evaluate(&snap).is_passed());
    }

    #[test]
    fn rejects_when_close_below_ma() {
        let mut snap = passing_snapshot("A");
        snap.ma200 = Some(55.0);
        assert_eq!(TrendFilter.evaluate(&snap), Verdict::BelowTrend);
    }

    #[test]
    fn undefined_ma_is_exempt() {
        let mut snap = passing_snapshot("NEW");
        snap.ma200 = None;
        snap.close = 1.0;
        assert!(TrendFilter.evaluate(&snap).is_passed());
    }

    #[test]
    fn name_is_correct() {
        assert_eq!(TrendFilter.name(), "ma_trend");
    }
}
