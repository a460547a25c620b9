//! Ledger integration for strategy reads and write-call construction.
//!
//! ## Reads
//! The `StrategyLedger` trait covers every read the core needs:
//! - Factory listings (all strategies, by curator, paginated, count)
//! - Per-strategy info tuple and destination list
//!
//! ## Implementations
//! - `RpcLedger`: JSON-RPC `eth_call` against an EVM node
//! - `MockLedger`: scripted in-memory ledger for tests and demos
//!
//! ## Writes
//! `CreateStrategyCall` and `FundCall` only build calldata; signing and
//! broadcasting belong to the wallet.

pub mod abi;
mod error;
pub mod mock;
mod rpc;
mod traits;
mod types;

pub use error::{LedgerError, Result};
pub use mock::MockLedger;
pub use rpc::RpcLedger;
pub use traits::StrategyLedger;
#[cfg(test)]
pub use traits::MockStrategyLedger;
pub use types::*;
