//! Price storage, profile registry, and history audit.

pub mod audit;
pub mod parquet;
pub mod profiles;
pub mod store;

pub use audit::{AuditFinding, AuditReport, HistoryAudit};
pub use parquet::{ParquetStore, TickerMeta, TickerStatus};
pub use profiles::ProfileRegistry;
pub use store::{MemoryStore, PriceStore, StoreError};
