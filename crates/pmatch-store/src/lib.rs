//! Storage for human review decisions on proposed patient matches.
//!
//! A decision is a (external id, internal id) key with a status of pending,
//! approved or denied. The CSV store rewrites its file atomically on every
//! change.

pub mod error;
pub mod store;
pub mod table;

pub use error::{Result, StoreError};
pub use store::{CsvDecisionStore, DecisionStore, MemoryDecisionStore};
pub use table::{DecisionTable, STATUS_COLUMN};
