//! Platform-wide totals, curator rollups and the fee histogram.

use std::collections::HashSet;
use std::fmt;

use alloy_primitives::{Address, U256};
use serde::Serialize;

use crate::strategy::StrategyRecord;

/// Totals across every record in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformTotals {
    pub strategies: usize,
    pub total_allocated: U256,
    pub total_donors: u64,
    pub unique_curators: usize,
}

/// Sum allocation and donors, and count distinct curators.
pub fn platform_totals(records: &[StrategyRecord]) -> PlatformTotals {
    let curators: HashSet<Address> = records.iter().map(|r| r.curator).collect();

    PlatformTotals {
        strategies: records.len(),
        total_allocated: records
            .iter()
            .fold(U256::ZERO, |acc, r| acc.saturating_add(r.total_allocated)),
        total_donors: records
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.total_donors)),
        unique_curators: curators.len(),
    }
}

/// One curator's share of the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CuratorSummary {
    pub curator: Address,
    pub strategy_count: usize,
    pub total_allocated: U256,
}

/// Group records by curator and return the `k` best funded curators.
///
/// Groups are formed in order of each curator's first appearance, so equal
/// sums keep that order.
pub fn curator_rollup(records: &[StrategyRecord], k: usize) -> Vec<CuratorSummary> {
    let mut groups: Vec<CuratorSummary> = Vec::new();

    for record in records {
        match groups.iter_mut().find(|g| g.curator == record.curator) {
            Some(group) => {
                group.strategy_count += 1;
                group.total_allocated = group.total_allocated.saturating_add(record.total_allocated);
            }
            None => groups.push(CuratorSummary {
                curator: record.curator,
                strategy_count: 1,
                total_allocated: record.total_allocated,
            }),
        }
    }

    groups.sort_by(|a, b| b.total_allocated.cmp(&a.total_allocated));
    groups.truncate(k);
    groups
}

/// Fixed curator-fee ranges. Not derived from data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FeeBucket {
    /// [0, 100) bps
    UnderOne,
    /// [100, 200) bps
    OneToTwo,
    /// [200, 300) bps
    TwoToThree,
    /// [300, 500) bps
    ThreeToFive,
    /// 500 bps and above, unbounded
    FivePlus,
}

impl FeeBucket {
    pub const ALL: [FeeBucket; 5] = [
        FeeBucket::UnderOne,
        FeeBucket::OneToTwo,
        FeeBucket::TwoToThree,
        FeeBucket::ThreeToFive,
        FeeBucket::FivePlus,
    ];

    pub fn for_fee(fee_bps: u32) -> Self {
        match fee_bps {
            0..=99 => FeeBucket::UnderOne,
            100..=199 => FeeBucket::OneToTwo,
            200..=299 => FeeBucket::TwoToThree,
            300..=499 => FeeBucket::ThreeToFive,
            _ => FeeBucket::FivePlus,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FeeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FeeBucket::UnderOne => "0-1%",
            FeeBucket::OneToTwo => "1-2%",
            FeeBucket::TwoToThree => "2-3%",
            FeeBucket::ThreeToFive => "3-5%",
            FeeBucket::FivePlus => "5%+",
        };
        f.pad(label)
    }
}

/// Count of records per fee bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeHistogram {
    counts: [usize; 5],
}

impl FeeHistogram {
    pub fn count(&self, bucket: FeeBucket) -> usize {
        self.counts[bucket.index()]
    }

    /// Buckets in ascending fee order with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (FeeBucket, usize)> + '_ {
        FeeBucket::ALL.iter().map(|&b| (b, self.count(b)))
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

pub fn fee_histogram(records: &[StrategyRecord]) -> FeeHistogram {
    let mut histogram = FeeHistogram::default();
    for record in records {
        histogram.counts[FeeBucket::for_fee(record.curator_fee_bps).index()] += 1;
    }
    histogram
}
