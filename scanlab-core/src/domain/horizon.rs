//! Momentum horizons and per-horizon value sets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A gain look-back horizon, in calendar-month equivalents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    OneMonth,
    ThreeMonth,
    SixMonth,
}

impl Horizon {
    pub const ALL: [Horizon; 3] = [Horizon::OneMonth, Horizon::ThreeMonth, Horizon::SixMonth];

    /// Short label used in tables and logs ("1m", "3m", "6m").
    pub fn label(self) -> &'static str {
        match self {
            Horizon::OneMonth => "1m",
            Horizon::ThreeMonth => "3m",
            Horizon::SixMonth => "6m",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per horizon.
///
/// Used for gain windows, quantile levels, computed gains and thresholds,
/// so every per-horizon quantity is addressed the same way.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HorizonSet<T> {
    pub one_month: T,
    pub three_month: T,
    pub six_month: T,
}

impl<T> HorizonSet<T> {
    pub fn new(one_month: T, three_month: T, six_month: T) -> Self {
        Self {
            one_month,
            three_month,
            six_month,
        }
    }

    pub fn get(&self, horizon: Horizon) -> &T {
        match horizon {
            Horizon::OneMonth => &self.one_month,
            Horizon::ThreeMonth => &self.three_month,
            Horizon::SixMonth => &self.six_month,
        }
    }

    pub fn get_mut(&mut self, horizon: Horizon) -> &mut T {
        match horizon {
            Horizon::OneMonth => &mut self.one_month,
            Horizon::ThreeMonth => &mut self.three_month,
            Horizon::SixMonth => &mut self.six_month,
        }
    }

    /// Build a set by evaluating `f` for each horizon.
    pub fn from_fn(mut f: impl FnMut(Horizon) -> T) -> Self {
        Self {
            one_month: f(Horizon::OneMonth),
            three_month: f(Horizon::ThreeMonth),
            six_month: f(Horizon::SixMonth),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Horizon, &T)> {
        Horizon::ALL.into_iter().map(move |h| (h, self.get(h)))
    }
}
