//! In-memory ledger for tests and offline demos.
//!
//! Every per-strategy call can be scripted to succeed, fail, or stay pending
//! forever, with an optional delay, so batch reads can be exercised against
//! out-of-order and never-settling calls.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::error::{LedgerError, Result};
use super::traits::StrategyLedger;
use super::types::{RawDestination, RawStrategyInfo};
use crate::allocation::mul_bps;

/// How a scripted call resolves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CallBehavior {
    /// Return the stored data
    #[default]
    Respond,
    /// Fail with `LedgerError::Unavailable`
    Fail(String),
    /// Never resolve
    Pending,
}

/// One simulated strategy contract.
#[derive(Debug, Clone)]
pub struct MockStrategy {
    pub info: RawStrategyInfo,
    pub destinations: Vec<RawDestination>,
    pub info_behavior: CallBehavior,
    pub destinations_behavior: CallBehavior,
    /// Delay applied before either call resolves
    pub delay: Option<Duration>,
    donors: HashSet<Address>,
}

impl MockStrategy {
    pub fn new(info: RawStrategyInfo, destinations: Vec<RawDestination>) -> Self {
        Self {
            info,
            destinations,
            info_behavior: CallBehavior::Respond,
            destinations_behavior: CallBehavior::Respond,
            delay: None,
            donors: HashSet::new(),
        }
    }
}

/// Scripted `StrategyLedger`.
#[derive(Debug, Default)]
pub struct MockLedger {
    /// Strategies in creation order
    strategies: RwLock<Vec<(Address, MockStrategy)>>,
    list_behavior: RwLock<CallBehavior>,
    calls: AtomicUsize,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, before the ledger is shared.
    pub fn with_strategy(
        mut self,
        address: Address,
        info: RawStrategyInfo,
        destinations: Vec<RawDestination>,
    ) -> Self {
        self.strategies
            .get_mut()
            .push((address, MockStrategy::new(info, destinations)));
        self
    }

    /// Register a newly created strategy.
    pub async fn insert(
        &self,
        address: Address,
        info: RawStrategyInfo,
        destinations: Vec<RawDestination>,
    ) {
        self.strategies
            .write()
            .await
            .push((address, MockStrategy::new(info, destinations)));
    }

    pub async fn set_info_behavior(&self, address: Address, behavior: CallBehavior) {
        if let Some(strategy) = self.strategy_mut(address).await.as_deref_mut() {
            strategy.info_behavior = behavior;
        }
    }

    pub async fn set_destinations_behavior(&self, address: Address, behavior: CallBehavior) {
        if let Some(strategy) = self.strategy_mut(address).await.as_deref_mut() {
            strategy.destinations_behavior = behavior;
        }
    }

    pub async fn set_delay(&self, address: Address, delay: Option<Duration>) {
        if let Some(strategy) = self.strategy_mut(address).await.as_deref_mut() {
            strategy.delay = delay;
        }
    }

    /// Script the factory listing calls.
    pub async fn set_list_behavior(&self, behavior: CallBehavior) {
        *self.list_behavior.write().await = behavior;
    }

    /// Simulate a ledger-side funding event: bumps `totalAllocated` and counts
    /// the donor once. Returns the curator fee the ledger would take.
    pub async fn record_funding(
        &self,
        strategy: Address,
        donor: Address,
        amount: U256,
    ) -> Result<U256> {
        let mut strategies = self.strategies.write().await;
        let (_, entry) = strategies
            .iter_mut()
            .find(|(addr, _)| *addr == strategy)
            .ok_or_else(|| LedgerError::Unavailable(format!("unknown strategy {strategy}")))?;

        let fee_bps = u32::try_from(entry.info.curator_fee_bps).map_err(|_| {
            LedgerError::Unavailable(format!(
                "curator fee {} of {strategy} out of range",
                entry.info.curator_fee_bps
            ))
        })?;
        let curator_fee = mul_bps(amount, fee_bps);
        entry.info.total_allocated = entry.info.total_allocated.saturating_add(amount);
        if entry.donors.insert(donor) {
            entry.info.total_donors += U256::from(1u8);
        }

        info!(%strategy, %donor, %amount, %curator_fee, "Mock funding recorded");
        Ok(curator_fee)
    }

    /// Total ledger calls served (including failed and pending ones).
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    async fn strategy_mut(
        &self,
        address: Address,
    ) -> Option<tokio::sync::RwLockMappedWriteGuard<'_, MockStrategy>> {
        let guard = self.strategies.write().await;
        tokio::sync::RwLockWriteGuard::try_map(guard, |strategies| {
            strategies
                .iter_mut()
                .find(|(addr, _)| *addr == address)
                .map(|(_, strategy)| strategy)
        })
        .ok()
    }

    async fn lookup(&self, address: Address) -> Option<MockStrategy> {
        self.strategies
            .read()
            .await
            .iter()
            .find(|(addr, _)| *addr == address)
            .map(|(_, strategy)| strategy.clone())
    }

    async fn addresses(&self) -> Result<Vec<Address>> {
        let behavior = self.list_behavior.read().await.clone();
        let addresses = self
            .strategies
            .read()
            .await
            .iter()
            .map(|(addr, _)| *addr)
            .collect();
        resolve(behavior, None, addresses).await
    }

    fn count_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }
}

/// Apply a scripted behavior. No lock is held while waiting.
async fn resolve<T>(behavior: CallBehavior, delay: Option<Duration>, value: T) -> Result<T> {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    match behavior {
        CallBehavior::Respond => Ok(value),
        CallBehavior::Fail(message) => Err(LedgerError::Unavailable(message)),
        CallBehavior::Pending => std::future::pending().await,
    }
}

fn no_code(address: Address) -> LedgerError {
    LedgerError::Decode(format!("empty return data from {address}"))
}

#[async_trait]
impl StrategyLedger for MockLedger {
    async fn strategy_list(&self) -> Result<Vec<Address>> {
        self.count_call();
        self.addresses().await
    }

    async fn strategy_count(&self) -> Result<U256> {
        self.count_call();
        Ok(U256::from(self.addresses().await?.len()))
    }

    async fn strategies_by_curator(&self, curator: Address) -> Result<Vec<Address>> {
        self.count_call();
        let behavior = self.list_behavior.read().await.clone();
        let matching = self
            .strategies
            .read()
            .await
            .iter()
            .filter(|(_, strategy)| strategy.info.curator == curator)
            .map(|(addr, _)| *addr)
            .collect();
        resolve(behavior, None, matching).await
    }

    async fn strategies_paginated(&self, offset: U256, limit: U256) -> Result<Vec<Address>> {
        self.count_call();
        let all = self.addresses().await?;
        let len = U256::from(all.len());
        if offset >= len {
            return Ok(Vec::new());
        }
        let end = offset.saturating_add(limit).min(len);
        let start = offset.as_limbs()[0] as usize;
        let end = end.as_limbs()[0] as usize;
        Ok(all[start..end].to_vec())
    }

    async fn is_strategy(&self, address: Address) -> Result<bool> {
        self.count_call();
        Ok(self.lookup(address).await.is_some())
    }

    async fn strategy_info(&self, strategy: Address) -> Result<RawStrategyInfo> {
        self.count_call();
        let entry = self.lookup(strategy).await.ok_or_else(|| no_code(strategy))?;
        debug!(%strategy, behavior = ?entry.info_behavior, "Mock getInfo");
        resolve(entry.info_behavior, entry.delay, entry.info).await
    }

    async fn destinations(&self, strategy: Address) -> Result<Vec<RawDestination>> {
        self.count_call();
        let entry = self.lookup(strategy).await.ok_or_else(|| no_code(strategy))?;
        debug!(%strategy, behavior = ?entry.destinations_behavior, "Mock getDestinations");
        resolve(entry.destinations_behavior, entry.delay, entry.destinations).await
    }
}

/// A small ledger with three strategies for offline use of the CLI.
pub fn seeded() -> MockLedger {
    fn info(name: &str, curator: u8, fee: u64, allocated_eth: u64, donors: u64) -> RawStrategyInfo {
        RawStrategyInfo {
            name: name.to_string(),
            metadata_uri: String::new(),
            curator: Address::repeat_byte(curator),
            curator_fee_bps: U256::from(fee),
            total_allocated: U256::from(allocated_eth) * U256::from(10u64).pow(U256::from(18u64)),
            total_donors: U256::from(donors),
        }
    }

    fn dest(byte: u8, weight: u64, label: &str) -> RawDestination {
        RawDestination {
            recipient: Address::repeat_byte(byte),
            weight_bps: U256::from(weight),
            label: label.to_string(),
        }
    }

    MockLedger::new()
        .with_strategy(
            Address::repeat_byte(0xa1),
            info("Ethereum Core Dev Fund", 0xc1, 200, 42, 18),
            vec![
                dest(0x01, 5000, "Client teams"),
                dest(0x02, 3000, "Research"),
                dest(0x03, 2000, "Security audits"),
            ],
        )
        .with_strategy(
            Address::repeat_byte(0xa2),
            info("Open Source Tooling", 0xc2, 500, 7, 31),
            vec![dest(0x04, 6000, "Compilers"), dest(0x05, 4000, "Debuggers")],
        )
        .with_strategy(
            Address::repeat_byte(0xa3),
            info("Climate Commons", 0xc1, 0, 13, 5),
            vec![dest(0x06, 10_000, "Carbon removal")],
        )
}
