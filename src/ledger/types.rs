//! Raw ledger shapes and write-call parameters.

use alloy_primitives::{Address, U256};
use serde::Serialize;

use super::abi::{self, Token};
use crate::strategy::Destination;

/// Factory function signatures.
pub mod signatures {
    pub const GET_STRATEGIES: &str = "getStrategies()";
    pub const GET_STRATEGY_COUNT: &str = "getStrategyCount()";
    pub const GET_STRATEGIES_BY_CURATOR: &str = "getStrategiesByCurator(address)";
    pub const GET_STRATEGIES_PAGINATED: &str = "getStrategiesPaginated(uint256,uint256)";
    pub const IS_STRATEGY: &str = "isStrategy(address)";
    pub const CREATE_STRATEGY: &str =
        "createStrategy(string,string,uint256,(address,uint256,string)[])";

    pub const GET_INFO: &str = "getInfo()";
    pub const GET_DESTINATIONS: &str = "getDestinations()";
    pub const FUND: &str = "fund()";
    pub const FUND_ERC20: &str = "fundERC20(address,uint256)";
}

/// `getInfo()` return tuple, integers still at ledger width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStrategyInfo {
    pub name: String,
    pub metadata_uri: String,
    pub curator: Address,
    pub curator_fee_bps: U256,
    pub total_allocated: U256,
    pub total_donors: U256,
}

/// One `getDestinations()` entry, weight still at ledger width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDestination {
    pub recipient: Address,
    pub weight_bps: U256,
    pub label: String,
}

impl From<&Destination> for RawDestination {
    fn from(dest: &Destination) -> Self {
        Self {
            recipient: dest.recipient,
            weight_bps: U256::from(dest.weight_bps),
            label: dest.label.clone(),
        }
    }
}

/// Parameters for `createStrategy` on the factory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStrategyCall {
    pub name: String,
    #[serde(rename = "metadataURI")]
    pub metadata_uri: String,
    pub curator_fee_bps: u32,
    pub destinations: Vec<Destination>,
}

impl CreateStrategyCall {
    /// ABI-encoded calldata, selector included.
    pub fn calldata(&self) -> Vec<u8> {
        let destinations = self
            .destinations
            .iter()
            .map(|d| {
                Token::Tuple(vec![
                    Token::Address(d.recipient),
                    Token::Uint(U256::from(d.weight_bps)),
                    Token::String(d.label.clone()),
                ])
            })
            .collect();

        abi::encode_call(
            signatures::CREATE_STRATEGY,
            &[
                Token::String(self.name.clone()),
                Token::String(self.metadata_uri.clone()),
                Token::Uint(U256::from(self.curator_fee_bps)),
                Token::Array(destinations),
            ],
        )
    }
}

/// A prospective funding of one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundCall {
    /// Native currency attached as call value
    Native { strategy: Address, value: U256 },
    /// Fungible token pulled by the strategy (requires prior approval)
    Token {
        strategy: Address,
        token: Address,
        amount: U256,
    },
}

impl FundCall {
    /// Strategy contract the call targets.
    pub fn target(&self) -> Address {
        match self {
            FundCall::Native { strategy, .. } | FundCall::Token { strategy, .. } => *strategy,
        }
    }

    /// Native value to attach.
    pub fn value(&self) -> U256 {
        match self {
            FundCall::Native { value, .. } => *value,
            FundCall::Token { .. } => U256::ZERO,
        }
    }

    /// Amount being funded, in the token's smallest unit.
    pub fn amount(&self) -> U256 {
        match self {
            FundCall::Native { value, .. } => *value,
            FundCall::Token { amount, .. } => *amount,
        }
    }

    pub fn calldata(&self) -> Vec<u8> {
        match self {
            FundCall::Native { .. } => abi::encode_call(signatures::FUND, &[]),
            FundCall::Token { token, amount, .. } => abi::encode_call(
                signatures::FUND_ERC20,
                &[Token::Address(*token), Token::Uint(*amount)],
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fund_native_calldata_is_bare_selector() {
        let call = FundCall::Native {
            strategy: Address::repeat_byte(0x11),
            value: U256::from(5u64),
        };
        assert_eq!(call.calldata(), abi::selector(signatures::FUND).to_vec());
        assert_eq!(call.value(), U256::from(5u64));
        assert_eq!(call.target(), Address::repeat_byte(0x11));
    }

    #[test]
    fn test_fund_token_calldata_layout() {
        let token = Address::repeat_byte(0xaa);
        let call = FundCall::Token {
            strategy: Address::repeat_byte(0x11),
            token,
            amount: U256::from(1_000u64),
        };
        let data = call.calldata();

        assert_eq!(data.len(), 4 + 64);
        assert_eq!(&data[..4], &abi::selector(signatures::FUND_ERC20));
        assert_eq!(&data[16..36], token.as_slice());
        assert_eq!(U256::from_be_slice(&data[36..68]), U256::from(1_000u64));
        assert_eq!(call.value(), U256::ZERO);
    }

    #[test]
    fn test_create_strategy_calldata_head() {
        let call = CreateStrategyCall {
            name: "Core Devs".to_string(),
            metadata_uri: "data:application/json,%7B%7D".to_string(),
            curator_fee_bps: 200,
            destinations: vec![Destination {
                recipient: Address::repeat_byte(0x22),
                weight_bps: 10_000,
                label: "Client team".to_string(),
            }],
        };
        let data = call.calldata();

        assert_eq!(&data[..4], &abi::selector(signatures::CREATE_STRATEGY));
        let body = &data[4..];
        // Head: two string offsets, the fee, then the array offset
        assert_eq!(U256::from_be_slice(&body[0..32]), U256::from(128u64));
        assert_eq!(U256::from_be_slice(&body[64..96]), U256::from(200u64));
        assert_eq!(body.len() % 32, 0);
    }
}
