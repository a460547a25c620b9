//! Immutable views of an in-progress or finished batch read.

use std::fmt;

use alloy_primitives::Address;
use chrono::{DateTime, Utc};

use crate::strategy::{RecordError, StrategyRecord};

/// State of the address listing that seeds a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressState {
    /// Listing call still in flight
    Pending,
    /// Listing resolved with this many addresses
    Ready(usize),
    /// Listing call failed
    Failed(String),
}

/// Which per-strategy call a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Info,
    Destinations,
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallKind::Info => write!(f, "getInfo"),
            CallKind::Destinations => write!(f, "getDestinations"),
        }
    }
}

/// Why one address is missing from a snapshot's records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// A remote call errored
    CallFailed { call: CallKind, message: String },
    /// Both calls resolved but the data could not form a record
    Malformed(RecordError),
    /// Calls were still pending when the batch stopped waiting
    Incomplete(RecordError),
}

/// A per-address read failure. Never fatal to the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadFailure {
    /// Position of the address in the batch input
    pub index: usize,
    pub address: Address,
    pub kind: FailureKind,
}

/// Everything known about one batch at a point in time.
///
/// Records are in input-address order. Ranking is left to `views`.
#[derive(Debug, Clone)]
pub struct BatchSnapshot {
    /// Batch generation that produced this snapshot (0 = nothing read yet)
    pub generation: u64,
    pub addresses: AddressState,
    /// Strategies whose info and destinations both resolved
    pub records: Vec<StrategyRecord>,
    /// True while any call of this batch is outstanding
    pub loading: bool,
    /// True once any call of this batch has failed
    pub has_error: bool,
    pub failures: Vec<ReadFailure>,
    pub updated_at: DateTime<Utc>,
}

impl BatchSnapshot {
    /// Snapshot of a batch whose address listing is still in flight.
    pub fn pending(generation: u64) -> Self {
        Self {
            generation,
            addresses: AddressState::Pending,
            records: Vec::new(),
            loading: true,
            has_error: false,
            failures: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Snapshot of a batch that never got past its address listing.
    pub fn listing_failed(generation: u64, message: String) -> Self {
        Self {
            generation,
            addresses: AddressState::Failed(message),
            records: Vec::new(),
            loading: false,
            has_error: true,
            failures: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Loading finished without any failure.
    pub fn is_complete(&self) -> bool {
        !self.loading && !self.has_error
    }

    pub fn record(&self, address: Address) -> Option<&StrategyRecord> {
        self.records.iter().find(|r| r.address == address)
    }

    pub fn failure(&self, address: Address) -> Option<&ReadFailure> {
        self.failures.iter().find(|f| f.address == address)
    }
}

/// Nothing has been read yet.
impl Default for BatchSnapshot {
    fn default() -> Self {
        Self::pending(0)
    }
}
