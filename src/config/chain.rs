//! Supported chains and their deployment defaults.

use std::fmt;

use alloy_primitives::{address, Address};

/// Factory address of the first contract Anvil deploys from its default key.
const FOUNDRY_FACTORY: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

/// A chain the strategy factory is deployed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chain {
    Base,
    BaseSepolia,
    Foundry,
}

impl Chain {
    pub const ALL: [Chain; 3] = [Chain::Base, Chain::BaseSepolia, Chain::Foundry];

    /// Look up a chain id. Unknown ids fall back to the local Foundry chain.
    pub fn from_id(chain_id: u64) -> Self {
        Self::ALL
            .into_iter()
            .find(|chain| chain.id() == chain_id)
            .unwrap_or(Chain::Foundry)
    }

    pub fn is_known(chain_id: u64) -> bool {
        Self::ALL.iter().any(|chain| chain.id() == chain_id)
    }

    pub fn id(self) -> u64 {
        match self {
            Chain::Base => 8453,
            Chain::BaseSepolia => 84532,
            Chain::Foundry => 31337,
        }
    }

    pub fn default_rpc_url(self) -> &'static str {
        match self {
            Chain::Base => "https://mainnet.base.org",
            Chain::BaseSepolia => "https://sepolia.base.org",
            Chain::Foundry => "http://127.0.0.1:8545",
        }
    }

    /// Baked-in factory address. Zero where nothing is deployed yet.
    pub fn factory_address(self) -> Address {
        match self {
            Chain::Base | Chain::BaseSepolia => Address::ZERO,
            Chain::Foundry => FOUNDRY_FACTORY,
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Chain::Base => "Base",
            Chain::BaseSepolia => "Base Sepolia",
            Chain::Foundry => "Foundry",
        };
        f.write_str(name)
    }
}
