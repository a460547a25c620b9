//! Basis-point allocation math.
//!
//! Pure functions over destination weights and curator fee rates:
//! - Weight totals, validation and normalization
//! - Gross fee/share splitting of funded amounts
//! - Percent conversions for display

mod math;
mod split;

pub use math::{
    bps_to_percent, is_valid_weight_set, normalize, percent_to_bps, total_weight, BPS_DENOMINATOR,
    MAX_CURATOR_FEE_BPS, MAX_DESTINATIONS,
};
pub use split::{mul_bps, split_amount, AllocationSplit, Residual};
