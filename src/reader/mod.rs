//! Batched strategy reads and live snapshots.
//!
//! The reader fans out the per-strategy calls, tolerates per-address failure
//! and reports progress as immutable [`BatchSnapshot`]s. The feed layers
//! superseding refreshes on top of it.

mod batch;
mod feed;
mod snapshot;

pub use batch::{BatchedStateReader, ReadError};
pub use feed::StrategyFeed;
pub use snapshot::{AddressState, BatchSnapshot, CallKind, FailureKind, ReadFailure};
