//! Read interface of the strategy ledger.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use super::error::Result;
use super::types::{RawDestination, RawStrategyInfo};

/// Read access to the strategy factory and strategy contracts.
///
/// Every method is one independent remote call. Implementations must be
/// shareable across tasks: the batched reader issues many calls concurrently
/// against the same instance.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StrategyLedger: Send + Sync {
    /// Every strategy the factory has created, in creation order.
    async fn strategy_list(&self) -> Result<Vec<Address>>;

    /// Number of strategies the factory has created.
    async fn strategy_count(&self) -> Result<U256>;

    /// Strategies created by one curator.
    async fn strategies_by_curator(&self, curator: Address) -> Result<Vec<Address>>;

    /// A window of the creation-ordered list. Out-of-range offsets yield an
    /// empty list.
    async fn strategies_paginated(&self, offset: U256, limit: U256) -> Result<Vec<Address>>;

    /// Whether the factory created this address.
    async fn is_strategy(&self, address: Address) -> Result<bool>;

    /// `getInfo()` of one strategy.
    async fn strategy_info(&self, strategy: Address) -> Result<RawStrategyInfo>;

    /// `getDestinations()` of one strategy.
    async fn destinations(&self, strategy: Address) -> Result<Vec<RawDestination>>;
}
