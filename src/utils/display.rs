//! Human-readable rendering of ledger values.
//!
//! Display only. Nothing here feeds back into comparisons or arithmetic.

use alloy_primitives::utils as units;
use alloy_primitives::{Address, U256};

/// Decimals of the native currency (wei per ether = 10^18).
pub const ETHER_DECIMALS: u8 = 18;

/// Render a wei amount in ether with at most `max_decimals` fractional
/// digits, truncating the rest. Trailing zeros are dropped.
///
/// Exact for the full 256-bit range: no floating-point conversion.
pub fn format_ether(wei: U256, max_decimals: usize) -> String {
    format_units(wei, ETHER_DECIMALS, max_decimals)
}

/// Render a fixed-point amount with `decimals` implied fractional digits.
///
/// `decimals` above 77 is not a valid unit; the raw integer is returned.
pub fn format_units(amount: U256, decimals: u8, max_decimals: usize) -> String {
    let Ok(formatted) = units::format_units(amount, decimals) else {
        return amount.to_string();
    };
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), ""));

    let kept = &fraction[..max_decimals.min(fraction.len())];
    let kept = kept.trim_end_matches('0');
    if kept.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{kept}")
    }
}

/// Shorten an address to `0x1234...abcd` (checksummed, `chars` hex digits on
/// each side).
pub fn format_address(address: Address, chars: usize) -> String {
    let full = address.to_checksum(None);
    if chars * 2 + 2 >= full.len() {
        return full;
    }
    format!("{}...{}", &full[..chars + 2], &full[full.len() - chars..])
}

/// Cut a name to `max` characters, marking the cut with "...".
pub fn truncate_name(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    let head: String = name.chars().take(max).collect();
    format!("{head}...")
}
