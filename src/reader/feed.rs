//! Live strategy snapshot shared between a refresher and its observers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alloy_primitives::Address;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::batch::BatchedStateReader;
use super::snapshot::BatchSnapshot;

/// Publishes batch snapshots to subscribers.
///
/// Every refresh starts a new batch generation. Snapshots of a batch that has
/// been superseded by a newer refresh are dropped, so observers never see
/// stale data replace fresh data.
#[derive(Clone)]
pub struct StrategyFeed {
    reader: Arc<BatchedStateReader>,
    latest: Arc<AtomicU64>,
    tx: Arc<watch::Sender<BatchSnapshot>>,
}

impl StrategyFeed {
    pub fn new(reader: Arc<BatchedStateReader>) -> Self {
        let (tx, _) = watch::channel(BatchSnapshot::pending(0));
        Self {
            reader,
            latest: Arc::new(AtomicU64::new(0)),
            tx: Arc::new(tx),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<BatchSnapshot> {
        self.tx.subscribe()
    }

    /// Most recently published snapshot.
    pub fn current(&self) -> BatchSnapshot {
        self.tx.borrow().clone()
    }

    /// Generation of the newest refresh started so far.
    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Re-read every strategy in the background.
    pub fn refresh(&self) -> JoinHandle<BatchSnapshot> {
        let generation = self.begin();
        let reader = Arc::clone(&self.reader);
        let latest = Arc::clone(&self.latest);
        let tx = Arc::clone(&self.tx);

        tokio::spawn(async move {
            let mut on_progress = |snapshot: &BatchSnapshot| publish(&latest, &tx, snapshot);
            reader.read_all_in(generation, &mut on_progress).await
        })
    }

    /// Re-read a fixed set of strategies in the background.
    pub fn refresh_addresses(&self, addresses: Vec<Address>) -> JoinHandle<BatchSnapshot> {
        let generation = self.begin();
        let reader = Arc::clone(&self.reader);
        let latest = Arc::clone(&self.latest);
        let tx = Arc::clone(&self.tx);

        tokio::spawn(async move {
            let mut on_progress = |snapshot: &BatchSnapshot| publish(&latest, &tx, snapshot);
            reader.read_batch_in(generation, &addresses, &mut on_progress).await
        })
    }

    fn begin(&self) -> u64 {
        let generation = self.reader.next_generation();
        self.latest.fetch_max(generation, Ordering::SeqCst);
        info!(generation, "Strategy refresh started");
        generation
    }
}

fn publish(latest: &AtomicU64, tx: &watch::Sender<BatchSnapshot>, snapshot: &BatchSnapshot) {
    if snapshot.generation < latest.load(Ordering::SeqCst) {
        debug!(generation = snapshot.generation, "Dropping superseded snapshot");
        return;
    }

    tx.send_if_modified(|current| {
        if snapshot.generation < current.generation {
            return false;
        }
        *current = snapshot.clone();
        true
    });
}
