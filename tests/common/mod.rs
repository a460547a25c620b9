//! Common test utilities and fixtures

#![allow(dead_code)]

use alloy_primitives::{Address, U256};
use curator_studio::ledger::{MockLedger, RawDestination, RawStrategyInfo};

/// Address made of one repeated byte
pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

/// Create a sample `getInfo()` tuple
pub fn sample_info(name: &str, curator: u8, fee_bps: u64, allocated: u64, donors: u64) -> RawStrategyInfo {
    RawStrategyInfo {
        name: name.to_string(),
        metadata_uri: String::new(),
        curator: addr(curator),
        curator_fee_bps: U256::from(fee_bps),
        total_allocated: U256::from(allocated),
        total_donors: U256::from(donors),
    }
}

/// Create a destination list with the given weights and recipients 0x01, 0x02, ...
pub fn sample_destinations(weights: &[u64]) -> Vec<RawDestination> {
    weights
        .iter()
        .enumerate()
        .map(|(i, &weight)| RawDestination {
            recipient: addr(i as u8 + 1),
            weight_bps: U256::from(weight),
            label: format!("Destination {}", i + 1),
        })
        .collect()
}

/// The three strategies used by the partial-failure scenarios
pub const FIRST: u8 = 0xa1;
pub const SECOND: u8 = 0xa2;
pub const THIRD: u8 = 0xa3;

/// Ledger with FIRST, SECOND and THIRD, all readable
pub fn three_strategy_ledger() -> MockLedger {
    MockLedger::new()
        .with_strategy(
            addr(FIRST),
            sample_info("First", 0xc1, 100, 5, 1),
            sample_destinations(&[10_000]),
        )
        .with_strategy(
            addr(SECOND),
            sample_info("Second", 0xc2, 200, 100, 2),
            sample_destinations(&[5_000, 5_000]),
        )
        .with_strategy(
            addr(THIRD),
            sample_info("Third", 0xc1, 300, 5, 3),
            sample_destinations(&[2_500, 7_500]),
        )
}

pub fn three_addresses() -> Vec<Address> {
    vec![addr(FIRST), addr(SECOND), addr(THIRD)]
}
