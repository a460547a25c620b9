//! Per-destination amounts derived from a single strategy.

use alloy_primitives::{Address, U256};

use crate::allocation::{mul_bps, split_amount, AllocationSplit, Residual};
use crate::ledger::FundCall;
use crate::strategy::{Destination, StrategyRecord};

/// Lifetime amount attributed to one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationAllocation<'a> {
    pub destination: &'a Destination,
    /// floor(total_allocated * weight / 10000)
    pub allocated: U256,
}

/// Share of the strategy's lifetime allocation per destination, in display
/// order.
pub fn destination_allocations(record: &StrategyRecord) -> Vec<DestinationAllocation<'_>> {
    record
        .destinations
        .iter()
        .map(|destination| DestinationAllocation {
            destination,
            allocated: mul_bps(record.total_allocated, destination.weight_bps),
        })
        .collect()
}

/// What a prospective funding would do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundPreview {
    pub call: FundCall,
    pub split: AllocationSplit,
    /// Recipients in the same order as `split.per_destination`
    pub recipients: Vec<Address>,
}

impl FundPreview {
    pub fn residual(&self) -> Residual {
        self.split.residual()
    }
}

/// Preview funding `record` with `amount` of native currency, or of `token`
/// when given.
pub fn fund_preview(record: &StrategyRecord, amount: U256, token: Option<Address>) -> FundPreview {
    let call = match token {
        Some(token) => FundCall::Token {
            strategy: record.address,
            token,
            amount,
        },
        None => FundCall::Native {
            strategy: record.address,
            value: amount,
        },
    };

    FundPreview {
        call,
        split: split_amount(amount, record.curator_fee_bps, &record.weights()),
        recipients: record.destinations.iter().map(|d| d.recipient).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::tests::record;

    #[test]
    fn test_destination_allocations_floor() {
        let mut strategy = record(0x01, 1_001, 0, 0);
        strategy.destinations = vec![
            Destination {
                recipient: Address::repeat_byte(0x10),
                weight_bps: 3_333,
                label: "A".into(),
            },
            Destination {
                recipient: Address::repeat_byte(0x11),
                weight_bps: 6_667,
                label: "B".into(),
            },
        ];

        let allocations = destination_allocations(&strategy);
        // 1001 * 0.3333 = 333.63, 1001 * 0.6667 = 667.36
        assert_eq!(allocations[0].allocated, U256::from(333u64));
        assert_eq!(allocations[1].allocated, U256::from(667u64));
        assert_eq!(allocations[1].destination.label, "B");
    }

    #[test]
    fn test_destination_allocations_zero_total() {
        let strategy = record(0x01, 0, 0, 0);
        assert!(destination_allocations(&strategy)
            .iter()
            .all(|a| a.allocated.is_zero()));
    }

    #[test]
    fn test_fund_preview_native() {
        let strategy = record(0x01, 0, 200, 0);
        let preview = fund_preview(&strategy, U256::from(10_000u64), None);

        assert_eq!(preview.call.value(), U256::from(10_000u64));
        assert_eq!(preview.call.target(), strategy.address);
        assert_eq!(preview.split.curator_fee, U256::from(200u64));
        assert_eq!(preview.split.distributable, U256::from(9_800u64));
        assert_eq!(preview.recipients.len(), preview.split.per_destination.len());
        assert_eq!(preview.residual(), Residual::Excess(U256::from(200u64)));
    }

    #[test]
    fn test_fund_preview_token_attaches_no_value() {
        let strategy = record(0x01, 0, 0, 0);
        let token = Address::repeat_byte(0x77);
        let preview = fund_preview(&strategy, U256::from(3u64), Some(token));

        assert_eq!(preview.call.value(), U256::ZERO);
        assert_eq!(preview.call.amount(), U256::from(3u64));
        assert!(matches!(preview.call, FundCall::Token { token: t, .. } if t == token));
    }
}
