use crate::domain::ledger::PlayerLedger;
use crate::domain::ports::{LedgerStore, RequestStore, SettlementStore};
use crate::domain::request::{CreditRequest, RequestStatus};
use crate::domain::settlement::SettlementRecord;
use crate::domain::{PlayerId, RequestId};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// A thread-safe in-memory store for player ledgers.
///
/// Uses `Arc<RwLock<HashMap<PlayerId, PlayerLedger>>>` to allow shared concurrent access.
/// Ideal for testing or small datasets where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    ledgers: Arc<RwLock<HashMap<PlayerId, PlayerLedger>>>,
}

impl InMemoryLedgerStore {
    /// Creates a new, empty in-memory ledger store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn store(&self, ledger: PlayerLedger) -> Result<()> {
        let mut ledgers = self.ledgers.write().await;
        ledgers.insert(ledger.player_id, ledger);
        Ok(())
    }

    async fn get(&self, player_id: PlayerId) -> Result<Option<PlayerLedger>> {
        let ledgers = self.ledgers.read().await;
        Ok(ledgers.get(&player_id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<PlayerLedger>> {
        let ledgers = self.ledgers.read().await;
        let mut all: Vec<PlayerLedger> = ledgers.values().cloned().collect();
        all.sort_by_key(|l| l.player_id);
        Ok(all)
    }
}

/// A thread-safe in-memory store for credit requests.
///
/// The compare-and-set runs entirely under the write guard, so two callers
/// racing on one request observe a single winner.
#[derive(Default, Clone)]
pub struct InMemoryRequestStore {
    requests: Arc<RwLock<HashMap<RequestId, CreditRequest>>>,
    sequence: Arc<AtomicU64>,
}

impl InMemoryRequestStore {
    /// Creates a new, empty in-memory request store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RequestStore for InMemoryRequestStore {
    async fn next_id(&self) -> Result<RequestId> {
        Ok(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn insert(&self, request: CreditRequest) -> Result<()> {
        let mut requests = self.requests.write().await;
        requests.insert(request.id, request);
        Ok(())
    }

    async fn get(&self, request_id: RequestId) -> Result<Option<CreditRequest>> {
        let requests = self.requests.read().await;
        Ok(requests.get(&request_id).cloned())
    }

    async fn compare_and_set(
        &self,
        expected: RequestStatus,
        updated: CreditRequest,
    ) -> Result<bool> {
        let mut requests = self.requests.write().await;
        match requests.get_mut(&updated.id) {
            Some(current) if current.status == expected => {
                *current = updated;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn pending(&self) -> Result<Vec<CreditRequest>> {
        let requests = self.requests.read().await;
        let mut pending: Vec<CreditRequest> = requests
            .values()
            .filter(|r| r.is_pending())
            .cloned()
            .collect();
        pending.sort_by_key(|r| r.id);
        Ok(pending)
    }
}

/// Append-only in-memory settlement log, grouped by player.
#[derive(Default, Clone)]
pub struct InMemorySettlementStore {
    records: Arc<RwLock<HashMap<PlayerId, Vec<SettlementRecord>>>>,
    sequence: Arc<AtomicU64>,
}

impl InMemorySettlementStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettlementStore for InMemorySettlementStore {
    async fn append(&self, record: SettlementRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records.entry(record.player_id).or_default().push(record);
        Ok(())
    }

    async fn next_id(&self) -> Result<u64> {
        Ok(self.sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn history(&self, player_id: PlayerId) -> Result<Vec<SettlementRecord>> {
        let records = self.records.read().await;
        Ok(records.get(&player_id).cloned().unwrap_or_default())
    }
}
