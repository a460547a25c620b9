//! Weight arithmetic in basis points (1 bp = 0.01%).

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// A complete weight set sums to exactly this many basis points (100%).
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Highest curator fee the ledger accepts (10%).
pub const MAX_CURATOR_FEE_BPS: u32 = 1_000;

/// Maximum number of destinations per strategy.
pub const MAX_DESTINATIONS: usize = 10;

/// Sum of a weight set. Empty input sums to zero.
pub fn total_weight(weights: &[u32]) -> u64 {
    weights.iter().map(|&w| u64::from(w)).sum()
}

/// True iff the weights sum to exactly 10000 bps. An empty set is invalid.
pub fn is_valid_weight_set(weights: &[u32]) -> bool {
    total_weight(weights) == u64::from(BPS_DENOMINATOR)
}

/// Rescale weights proportionally so they sum to exactly 10000 bps.
///
/// Each weight is rounded to the nearest integer (halves round up), then the
/// rounding remainder `10000 - sum` is applied to the last element. An
/// all-zero (or empty) set has no proportions to preserve and is returned
/// unchanged.
///
/// If the remainder is negative and larger than the last element, the last
/// element bottoms out at zero and the leftover deficit moves to the
/// preceding elements, back to front. This only happens when the last weight
/// rounds to (almost) nothing.
pub fn normalize(weights: &[u32]) -> Vec<u32> {
    let total = total_weight(weights);
    if total == 0 {
        return weights.to_vec();
    }

    let target = u64::from(BPS_DENOMINATOR);
    let mut scaled: Vec<i64> = weights
        .iter()
        .map(|&w| {
            // round(w * 10000 / total) in integers
            let numerator = u64::from(w) * target * 2 + total;
            (numerator / (total * 2)) as i64
        })
        .collect();

    let rounded_sum: i64 = scaled.iter().sum();
    let mut remainder = target as i64 - rounded_sum;

    for weight in scaled.iter_mut().rev() {
        if remainder == 0 {
            break;
        }
        let adjusted = *weight + remainder;
        if adjusted >= 0 {
            *weight = adjusted;
            remainder = 0;
        } else {
            remainder = adjusted;
            *weight = 0;
        }
    }

    scaled.into_iter().map(|w| w as u32).collect()
}

/// Convert basis points to a percentage for display (250 bps -> 2.50).
pub fn bps_to_percent(bps: u32) -> Decimal {
    Decimal::new(i64::from(bps), 2)
}

/// Convert a percentage to basis points, rounding to the nearest bp.
///
/// Returns `None` for negative or out-of-range input.
pub fn percent_to_bps(percent: Decimal) -> Option<u32> {
    if percent.is_sign_negative() && !percent.is_zero() {
        return None;
    }
    (percent * dec!(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_weight() {
        assert_eq!(total_weight(&[]), 0);
        assert_eq!(total_weight(&[2500, 2500, 5000]), 10_000);
        assert_eq!(total_weight(&[u32::MAX, 1]), u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_valid_weight_sets() {
        assert!(!is_valid_weight_set(&[]));
        assert!(is_valid_weight_set(&[10_000]));
        assert!(is_valid_weight_set(&[5000, 5000]));
        assert!(!is_valid_weight_set(&[3333, 3333, 3333]));
        assert!(!is_valid_weight_set(&[6000, 5000]));
    }

    #[test]
    fn test_normalize_rescales_to_full_weight() {
        assert_eq!(normalize(&[6000, 3000]), vec![6667, 3333]);
        assert_eq!(normalize(&[1, 1, 1]), vec![3333, 3333, 3334]);
        assert_eq!(normalize(&[1, 3]), vec![2500, 7500]);
    }

    #[test]
    fn test_normalize_remainder_lands_on_last() {
        // Each 1/6 share rounds up to 1667, overshooting by 2
        let normalized = normalize(&[1, 1, 1, 1, 1, 1]);
        assert_eq!(normalized, vec![1667, 1667, 1667, 1667, 1667, 1665]);
        assert_eq!(total_weight(&normalized), 10_000);
    }

    #[test]
    fn test_normalize_deficit_spills_backwards_when_last_is_zero() {
        let normalized = normalize(&[1, 1, 1, 1, 1, 1, 0]);
        assert_eq!(total_weight(&normalized), 10_000);
        assert_eq!(normalized[6], 0);
        assert_eq!(normalized[5], 1665);
    }

    #[test]
    fn test_normalize_all_zero_is_noop() {
        assert_eq!(normalize(&[0, 0, 0]), vec![0, 0, 0]);
        assert_eq!(normalize(&[]), Vec::<u32>::new());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs: [&[u32]; 5] = [
            &[6000, 3000],
            &[1, 1, 1],
            &[7, 0, 13, 29],
            &[10_000],
            &[40_000, 1, 99_999, 3, 3, 3, 3, 3, 3, 3],
        ];
        for weights in inputs {
            let once = normalize(weights);
            assert_eq!(total_weight(&once), 10_000, "input {:?}", weights);
            assert_eq!(normalize(&once), once, "input {:?}", weights);
        }
    }

    #[test]
    fn test_bps_to_percent() {
        assert_eq!(bps_to_percent(250), dec!(2.50));
        assert_eq!(bps_to_percent(10_000), dec!(100));
        assert_eq!(bps_to_percent(1), dec!(0.01));
    }

    #[test]
    fn test_percent_to_bps() {
        assert_eq!(percent_to_bps(dec!(2.5)), Some(250));
        assert_eq!(percent_to_bps(dec!(33.333)), Some(3333));
        assert_eq!(percent_to_bps(dec!(0.005)), Some(1)); // half rounds away from zero
        assert_eq!(percent_to_bps(dec!(-1)), None);
    }
}
