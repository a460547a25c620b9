//! Derived views over a collection of strategy records.
//!
//! Everything here is a pure, deterministic transform. Records are never
//! mutated; ranked views borrow from the input.

mod aggregate;
mod preview;
mod ranking;

pub use aggregate::{
    curator_rollup, fee_histogram, platform_totals, CuratorSummary, FeeBucket, FeeHistogram,
    PlatformTotals,
};
pub use preview::{destination_allocations, fund_preview, DestinationAllocation, FundPreview};
pub use ranking::{rank_by_allocation, top_by_allocation, trending};
