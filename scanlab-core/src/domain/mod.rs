//! Domain types for the screener.

pub mod bar;
pub mod horizon;
pub mod profile;
pub mod snapshot;

pub use bar::PriceBar;
pub use horizon::{Horizon, HorizonSet};
pub use profile::TickerProfile;
pub use snapshot::{build_snapshots, DerivedRow, DerivedSeries, Snapshot, SnapshotSet};
