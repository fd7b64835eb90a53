//! Persistence: baseline file, scan-history store, and the `~/.ward` tree

pub mod baseline;
pub mod dirs;
pub mod store;

pub use baseline::{Baseline, BaselineEntry, BaselineError};
pub use store::{HistoryStore, ScanDiff, ScanRecord, StoreError};
