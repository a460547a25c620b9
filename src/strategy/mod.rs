//! Strategy record model.
//!
//! Canonical in-memory shape of a published strategy, built from raw ledger
//! reads with numeric narrowing and completeness checks.

mod metadata;
mod record;

pub use metadata::StrategyMetadata;
pub use record::{Destination, MissingPart, RecordError, StrategyRecord};
