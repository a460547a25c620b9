//! Ordered views over strategy records.

use crate::strategy::StrategyRecord;

/// Records ordered by `total_allocated`, highest first.
///
/// Exact 256-bit comparison. Equal totals keep their input order.
pub fn rank_by_allocation(records: &[StrategyRecord]) -> Vec<&StrategyRecord> {
    let mut ranked: Vec<&StrategyRecord> = records.iter().collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.total_allocated.cmp(&a.total_allocated));
    ranked
}

/// The `k` best funded records.
pub fn top_by_allocation(records: &[StrategyRecord], k: usize) -> Vec<&StrategyRecord> {
    let mut ranked = rank_by_allocation(records);
    ranked.truncate(k);
    ranked
}

/// The `k` records with the most distinct donors, highest first.
///
/// Independent of the allocation ranking; equal donor counts keep input order.
pub fn trending(records: &[StrategyRecord], k: usize) -> Vec<&StrategyRecord> {
    let mut ranked: Vec<&StrategyRecord> = records.iter().collect();
    ranked.sort_by(|a, b| b.total_donors.cmp(&a.total_donors));
    ranked.truncate(k);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::tests::record;
    use alloy_primitives::U256;

    #[test]
    fn test_rank_by_allocation_is_stable_on_ties() {
        let records = vec![
            record(0x01, 5, 0, 0),
            record(0x02, 100, 0, 0),
            record(0x03, 5, 0, 0),
        ];

        let ranked = rank_by_allocation(&records);
        let order: Vec<u8> = ranked.iter().map(|r| r.address.as_slice()[19]).collect();
        assert_eq!(order, vec![0x02, 0x01, 0x03]);
    }

    #[test]
    fn test_rank_compares_full_width() {
        let mut huge = record(0x01, 0, 0, 0);
        huge.total_allocated = U256::MAX;
        let mut slightly_less = record(0x02, 0, 0, 0);
        slightly_less.total_allocated = U256::MAX - U256::from(1u8);

        let records = vec![slightly_less, huge];
        let ranked = rank_by_allocation(&records);
        assert_eq!(ranked[0].total_allocated, U256::MAX);
    }

    #[test]
    fn test_top_by_allocation_slices() {
        let records: Vec<_> = (1..=8u8).map(|i| record(i, u64::from(i), 0, 0)).collect();

        let top = top_by_allocation(&records, 5);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].total_allocated, U256::from(8u64));
        assert_eq!(top[4].total_allocated, U256::from(4u64));

        assert_eq!(top_by_allocation(&records, 20).len(), 8);
        assert!(top_by_allocation(&records, 0).is_empty());
    }

    #[test]
    fn test_trending_ranks_by_donors_not_allocation() {
        let records = vec![
            record(0x01, 1_000, 0, 2),
            record(0x02, 1, 0, 40),
            record(0x03, 50, 0, 9),
            record(0x04, 500, 0, 40),
        ];

        let top = trending(&records, 3);
        let order: Vec<u8> = top.iter().map(|r| r.address.as_slice()[19]).collect();
        assert_eq!(order, vec![0x02, 0x04, 0x03]);
    }
}
