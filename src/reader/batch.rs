//! Fan-out/fan-in reads of many strategies.
//!
//! Each strategy needs two independent calls (`getInfo`, `getDestinations`).
//! All 2N calls are issued at once and collected as they resolve, in any
//! order. A record is assembled as soon as both of its calls succeed; a
//! failed or never-settling call only removes its own address from the
//! result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;
use futures_util::{FutureExt, StreamExt};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::snapshot::{AddressState, BatchSnapshot, CallKind, FailureKind, ReadFailure};
use crate::config::ReaderConfig;
use crate::ledger::{self, LedgerError, RawDestination, RawStrategyInfo, StrategyLedger};
use crate::strategy::{MissingPart, RecordError, StrategyRecord};

/// Failure of a single-strategy read.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Record(#[from] RecordError),
}

enum CallOutcome {
    Info(ledger::Result<RawStrategyInfo>),
    Destinations(ledger::Result<Vec<RawDestination>>),
}

/// Per-address progress inside one batch.
struct Slot {
    address: Address,
    info: Option<RawStrategyInfo>,
    destinations: Option<Vec<RawDestination>>,
    record: Option<StrategyRecord>,
    failure: Option<FailureKind>,
}

struct BatchState {
    generation: u64,
    slots: Vec<Slot>,
    outstanding: usize,
}

impl BatchState {
    fn new(generation: u64, addresses: &[Address]) -> Self {
        let slots = addresses
            .iter()
            .map(|&address| Slot {
                address,
                info: None,
                destinations: None,
                record: None,
                failure: None,
            })
            .collect();

        Self {
            generation,
            slots,
            outstanding: addresses.len() * 2,
        }
    }

    fn apply(&mut self, index: usize, outcome: CallOutcome) {
        self.outstanding -= 1;
        let slot = &mut self.slots[index];

        let failed = match outcome {
            CallOutcome::Info(Ok(info)) => {
                slot.info = Some(info);
                None
            }
            CallOutcome::Destinations(Ok(destinations)) => {
                slot.destinations = Some(destinations);
                None
            }
            CallOutcome::Info(Err(e)) => Some((CallKind::Info, e)),
            CallOutcome::Destinations(Err(e)) => Some((CallKind::Destinations, e)),
        };

        if let Some((call, error)) = failed {
            warn!(address = %slot.address, %call, %error, "Strategy read failed");
            // First failure wins; the sibling call's result is ignored
            if slot.failure.is_none() {
                slot.failure = Some(FailureKind::CallFailed {
                    call,
                    message: error.to_string(),
                });
            }
            return;
        }

        if slot.failure.is_none() && slot.info.is_some() && slot.destinations.is_some() {
            match StrategyRecord::from_raw(slot.address, slot.info.take(), slot.destinations.take())
            {
                Ok(record) => {
                    debug!(address = %slot.address, "Strategy record assembled");
                    slot.record = Some(record);
                }
                Err(e) => {
                    warn!(address = %slot.address, error = %e, "Malformed strategy data");
                    slot.failure = Some(FailureKind::Malformed(e));
                }
            }
        }
    }

    /// Current view. `expired` marks still-pending calls as incomplete.
    fn snapshot(&self, expired: bool) -> BatchSnapshot {
        let mut records = Vec::new();
        let mut failures = Vec::new();

        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(record) = &slot.record {
                records.push(record.clone());
                continue;
            }

            let kind = match &slot.failure {
                Some(kind) => kind.clone(),
                None if expired => {
                    let missing = match (slot.info.is_some(), slot.destinations.is_some()) {
                        (true, false) => MissingPart::Destinations,
                        (false, true) => MissingPart::Info,
                        _ => MissingPart::Both,
                    };
                    FailureKind::Incomplete(RecordError::IncompleteRecord {
                        address: slot.address,
                        missing,
                    })
                }
                None => continue,
            };

            failures.push(ReadFailure {
                index,
                address: slot.address,
                kind,
            });
        }

        BatchSnapshot {
            generation: self.generation,
            addresses: AddressState::Ready(self.slots.len()),
            records,
            loading: self.outstanding > 0 && !expired,
            has_error: !failures.is_empty(),
            failures,
            updated_at: chrono::Utc::now(),
        }
    }
}

/// Batched, partial-failure-tolerant strategy reader.
pub struct BatchedStateReader {
    ledger: Arc<dyn StrategyLedger>,
    settle_timeout: Option<Duration>,
    generation: AtomicU64,
}

impl BatchedStateReader {
    /// Reader that waits for every call to settle.
    pub fn new(ledger: Arc<dyn StrategyLedger>) -> Self {
        Self {
            ledger,
            settle_timeout: None,
            generation: AtomicU64::new(0),
        }
    }

    pub fn from_config(ledger: Arc<dyn StrategyLedger>, config: &ReaderConfig) -> Self {
        Self::new(ledger).with_settle_timeout(config.settle_timeout())
    }

    /// Stop waiting for a batch after this long; calls still pending then are
    /// reported as incomplete.
    pub fn with_settle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.settle_timeout = timeout;
        self
    }

    pub fn ledger(&self) -> &Arc<dyn StrategyLedger> {
        &self.ledger
    }

    /// Reserve the generation number of a new batch.
    pub(crate) fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Read a fixed set of strategies and return the settled snapshot.
    pub async fn read_batch(&self, addresses: &[Address]) -> BatchSnapshot {
        self.read_batch_with(addresses, |_| {}).await
    }

    /// Like `read_batch`, reporting every intermediate snapshot.
    pub async fn read_batch_with<F>(&self, addresses: &[Address], mut on_progress: F) -> BatchSnapshot
    where
        F: FnMut(&BatchSnapshot) + Send,
    {
        let generation = self.next_generation();
        self.run_batch(generation, addresses, &mut on_progress).await
    }

    /// List every strategy on the factory, then read them all.
    pub async fn read_all(&self) -> BatchSnapshot {
        self.read_all_with(|_| {}).await
    }

    /// Like `read_all`, reporting every intermediate snapshot, starting with
    /// the pending-listing state.
    pub async fn read_all_with<F>(&self, mut on_progress: F) -> BatchSnapshot
    where
        F: FnMut(&BatchSnapshot) + Send,
    {
        let generation = self.next_generation();
        self.read_all_in(generation, &mut on_progress).await
    }

    pub(crate) async fn read_all_in<F>(&self, generation: u64, on_progress: &mut F) -> BatchSnapshot
    where
        F: FnMut(&BatchSnapshot) + Send,
    {
        on_progress(&BatchSnapshot::pending(generation));

        let addresses = match self.ledger.strategy_list().await {
            Ok(addresses) => addresses,
            Err(e) => {
                warn!(generation, error = %e, "Failed to list strategies");
                let snapshot = BatchSnapshot::listing_failed(generation, e.to_string());
                on_progress(&snapshot);
                return snapshot;
            }
        };

        self.run_batch(generation, &addresses, on_progress).await
    }

    pub(crate) async fn read_batch_in<F>(
        &self,
        generation: u64,
        addresses: &[Address],
        on_progress: &mut F,
    ) -> BatchSnapshot
    where
        F: FnMut(&BatchSnapshot) + Send,
    {
        self.run_batch(generation, addresses, on_progress).await
    }

    #[instrument(skip(self, addresses, on_progress), fields(strategies = addresses.len()))]
    async fn run_batch<F>(
        &self,
        generation: u64,
        addresses: &[Address],
        on_progress: &mut F,
    ) -> BatchSnapshot
    where
        F: FnMut(&BatchSnapshot) + Send,
    {
        let mut state = BatchState::new(generation, addresses);
        let mut calls: FuturesUnordered<BoxFuture<'static, (usize, CallOutcome)>> =
            FuturesUnordered::new();

        for (index, &address) in addresses.iter().enumerate() {
            let ledger = Arc::clone(&self.ledger);
            calls.push(
                async move { (index, CallOutcome::Info(ledger.strategy_info(address).await)) }
                    .boxed(),
            );
            let ledger = Arc::clone(&self.ledger);
            calls.push(
                async move {
                    let result = ledger.destinations(address).await;
                    (index, CallOutcome::Destinations(result))
                }
                .boxed(),
            );
        }

        on_progress(&state.snapshot(false));

        let deadline = self.settle_timeout.map(|timeout| Instant::now() + timeout);
        let mut expired = false;

        loop {
            let next = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, calls.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        expired = true;
                        None
                    }
                },
                None => calls.next().await,
            };

            let Some((index, outcome)) = next else {
                break;
            };
            state.apply(index, outcome);

            if state.outstanding > 0 {
                on_progress(&state.snapshot(false));
            }
        }

        // Dropping the remaining futures abandons calls that never settled
        drop(calls);

        let snapshot = state.snapshot(expired);
        info!(
            generation,
            requested = addresses.len(),
            assembled = snapshot.records.len(),
            failed = snapshot.failures.len(),
            expired,
            "Strategy batch settled"
        );
        on_progress(&snapshot);
        snapshot
    }

    /// Read one strategy (both calls) into a record.
    #[instrument(skip(self))]
    pub async fn read_strategy(&self, address: Address) -> Result<StrategyRecord, ReadError> {
        let (info, destinations) = tokio::try_join!(
            self.ledger.strategy_info(address),
            self.ledger.destinations(address)
        )?;
        Ok(StrategyRecord::from_raw(
            address,
            Some(info),
            Some(destinations),
        )?)
    }

    /// Ledger-global strategy count, independent of any batch.
    pub async fn strategy_count(&self) -> Result<U256, LedgerError> {
        self.ledger.strategy_count().await
    }

    /// Addresses created by one curator (filtered by the ledger).
    pub async fn strategies_by_curator(&self, curator: Address) -> Result<Vec<Address>, LedgerError> {
        self.ledger.strategies_by_curator(curator).await
    }

    /// One page of the creation-ordered address list.
    pub async fn strategies_paginated(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Address>, LedgerError> {
        self.ledger
            .strategies_paginated(U256::from(offset), U256::from(limit))
            .await
    }

    pub async fn is_strategy(&self, address: Address) -> Result<bool, LedgerError> {
        self.ledger.is_strategy(address).await
    }

    /// Read every strategy of one curator.
    pub async fn read_curator(&self, curator: Address) -> Result<BatchSnapshot, LedgerError> {
        let addresses = self.strategies_by_curator(curator).await?;
        Ok(self.read_batch(&addresses).await)
    }

    /// Read one page of strategies.
    pub async fn read_page(&self, offset: u64, limit: u64) -> Result<BatchSnapshot, LedgerError> {
        let addresses = self.strategies_paginated(offset, limit).await?;
        Ok(self.read_batch(&addresses).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::mock::{self, CallBehavior};
    use crate::ledger::{MockLedger, MockStrategyLedger};
    use tokio_test::{assert_err, assert_ok};

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn info(name: &str, allocated: u64) -> RawStrategyInfo {
        RawStrategyInfo {
            name: name.to_string(),
            metadata_uri: String::new(),
            curator: addr(0xc0),
            curator_fee_bps: U256::from(100u64),
            total_allocated: U256::from(allocated),
            total_donors: U256::from(1u64),
        }
    }

    fn single_destination() -> Vec<RawDestination> {
        vec![RawDestination {
            recipient: addr(0x01),
            weight_bps: U256::from(10_000u64),
            label: "All".to_string(),
        }]
    }

    fn three_strategy_ledger() -> MockLedger {
        MockLedger::new()
            .with_strategy(addr(0xa1), info("one", 5), single_destination())
            .with_strategy(addr(0xa2), info("two", 100), single_destination())
            .with_strategy(addr(0xa3), info("three", 5), single_destination())
    }

    #[tokio::test]
    async fn test_failed_call_excludes_only_its_address() {
        let ledger = Arc::new(three_strategy_ledger());
        ledger
            .set_destinations_behavior(addr(0xa2), CallBehavior::Fail("reverted".into()))
            .await;
        let reader = BatchedStateReader::new(ledger.clone());

        let snapshot = reader.read_batch(&[addr(0xa1), addr(0xa2), addr(0xa3)]).await;

        let names: Vec<_> = snapshot.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["one", "three"]);
        assert!(!snapshot.loading);
        assert!(snapshot.has_error);
        assert_eq!(snapshot.failures.len(), 1);
        assert_eq!(snapshot.failures[0].index, 1);
        assert!(matches!(
            snapshot.failures[0].kind,
            FailureKind::CallFailed {
                call: CallKind::Destinations,
                ..
            }
        ));
        assert_eq!(ledger.call_count(), 6);
    }

    #[tokio::test]
    async fn test_pending_call_reported_incomplete_after_settle_timeout() {
        let ledger = Arc::new(three_strategy_ledger());
        ledger
            .set_destinations_behavior(addr(0xa2), CallBehavior::Pending)
            .await;
        let reader = BatchedStateReader::new(ledger)
            .with_settle_timeout(Some(Duration::from_millis(50)));

        let snapshot = reader.read_batch(&[addr(0xa1), addr(0xa2), addr(0xa3)]).await;

        assert_eq!(snapshot.records.len(), 2);
        assert!(snapshot.record(addr(0xa2)).is_none());
        assert!(!snapshot.loading);
        assert_eq!(
            snapshot.failure(addr(0xa2)).map(|f| &f.kind),
            Some(&FailureKind::Incomplete(RecordError::IncompleteRecord {
                address: addr(0xa2),
                missing: MissingPart::Destinations,
            }))
        );
    }

    #[tokio::test]
    async fn test_progress_snapshots_improve_monotonically() {
        let ledger = Arc::new(three_strategy_ledger());
        ledger.set_delay(addr(0xa1), Some(Duration::from_millis(40))).await;
        let reader = BatchedStateReader::new(ledger);

        let mut seen = Vec::new();
        let last = reader
            .read_batch_with(&[addr(0xa1), addr(0xa2), addr(0xa3)], |snapshot| {
                seen.push((snapshot.records.len(), snapshot.loading));
            })
            .await;

        assert_eq!(seen.first(), Some(&(0, true)));
        assert_eq!(seen.last(), Some(&(3, false)));
        assert!(seen.windows(2).all(|pair| pair[0].0 <= pair[1].0));
        // Partial results are visible while the delayed strategy is in flight
        assert!(seen.iter().any(|&(count, loading)| loading && count == 2));
        // Input order is kept even though the first address resolved last
        assert_eq!(last.records[0].address, addr(0xa1));
    }

    #[tokio::test]
    async fn test_read_all_lists_then_reads() {
        let reader = BatchedStateReader::new(Arc::new(mock::seeded()));

        let mut states = Vec::new();
        let snapshot = reader
            .read_all_with(|s| states.push(s.addresses.clone()))
            .await;

        assert_eq!(states.first(), Some(&AddressState::Pending));
        assert_eq!(snapshot.addresses, AddressState::Ready(3));
        assert!(snapshot.is_complete());
        assert_eq!(snapshot.records.len(), 3);
    }

    #[tokio::test]
    async fn test_read_all_listing_failure() {
        let ledger = Arc::new(mock::seeded());
        ledger
            .set_list_behavior(CallBehavior::Fail("node offline".into()))
            .await;
        let reader = BatchedStateReader::new(ledger);

        let snapshot = reader.read_all().await;

        assert!(matches!(snapshot.addresses, AddressState::Failed(_)));
        assert!(snapshot.has_error);
        assert!(!snapshot.loading);
        assert!(snapshot.records.is_empty());
    }

    #[tokio::test]
    async fn test_empty_batch_settles_immediately() {
        let reader = BatchedStateReader::new(Arc::new(MockLedger::new()));
        let snapshot = reader.read_batch(&[]).await;
        assert!(snapshot.is_complete());
        assert_eq!(snapshot.addresses, AddressState::Ready(0));
    }

    #[tokio::test]
    async fn test_generations_increase_per_batch() {
        let reader = BatchedStateReader::new(Arc::new(mock::seeded()));
        let first = reader.read_all().await;
        let second = reader.read_all().await;
        assert!(second.generation > first.generation);
    }

    #[tokio::test]
    async fn test_read_strategy_single() {
        let reader = BatchedStateReader::new(Arc::new(mock::seeded()));
        let record = assert_ok!(reader.read_strategy(addr(0xa2)).await);
        assert_eq!(record.name, "Open Source Tooling");

        assert_err!(reader.read_strategy(addr(0xee)).await);
    }

    #[tokio::test]
    async fn test_listing_passthroughs_use_ledger() {
        let mut ledger = MockStrategyLedger::new();
        ledger
            .expect_strategy_count()
            .times(1)
            .returning(|| Ok(U256::from(42u64)));
        ledger
            .expect_strategies_paginated()
            .withf(|offset, limit| *offset == U256::from(10u64) && *limit == U256::from(5u64))
            .times(1)
            .returning(|_, _| Ok(vec![Address::repeat_byte(7)]));

        let reader = BatchedStateReader::new(Arc::new(ledger));

        assert_eq!(reader.strategy_count().await.unwrap(), U256::from(42u64));
        assert_eq!(
            reader.strategies_paginated(10, 5).await.unwrap(),
            vec![Address::repeat_byte(7)]
        );
    }
}
