//! In-memory stores whose writes can be switched to fail.

use crate::domain::ledger::PlayerLedger;
use crate::domain::ports::{LedgerStore, RequestStore, SettlementStore};
use crate::domain::request::{CreditRequest, RequestStatus};
use crate::domain::settlement::SettlementRecord;
use crate::domain::{PlayerId, RequestId};
use crate::error::{CreditError, Result};
use crate::infrastructure::in_memory::{
    InMemoryLedgerStore, InMemoryRequestStore, InMemorySettlementStore,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared on/off switch; clones observe the same state.
#[derive(Clone, Default)]
pub struct Fault(Arc<AtomicBool>);

impl Fault {
    pub fn arm(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn disarm(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    fn check(&self, op: &str) -> Result<()> {
        if self.0.load(Ordering::SeqCst) {
            return Err(CreditError::storage(std::io::Error::other(format!(
                "{} unavailable",
                op
            ))));
        }
        Ok(())
    }
}

/// Fails `store` while armed.
#[derive(Clone, Default)]
pub struct FaultyLedgerStore {
    inner: InMemoryLedgerStore,
    pub fault: Fault,
}

#[async_trait]
impl LedgerStore for FaultyLedgerStore {
    async fn store(&self, ledger: PlayerLedger) -> Result<()> {
        self.fault.check("ledger store")?;
        self.inner.store(ledger).await
    }

    async fn get(&self, player_id: PlayerId) -> Result<Option<PlayerLedger>> {
        self.inner.get(player_id).await
    }

    async fn get_all(&self) -> Result<Vec<PlayerLedger>> {
        self.inner.get_all().await
    }
}

/// Fails `insert` while armed.
#[derive(Clone, Default)]
pub struct FaultyRequestStore {
    inner: InMemoryRequestStore,
    pub fault: Fault,
}

#[async_trait]
impl RequestStore for FaultyRequestStore {
    async fn next_id(&self) -> Result<RequestId> {
        self.inner.next_id().await
    }

    async fn insert(&self, request: CreditRequest) -> Result<()> {
        self.fault.check("request insert")?;
        self.inner.insert(request).await
    }

    async fn get(&self, request_id: RequestId) -> Result<Option<CreditRequest>> {
        self.inner.get(request_id).await
    }

    async fn compare_and_set(
        &self,
        expected: RequestStatus,
        updated: CreditRequest,
    ) -> Result<bool> {
        self.inner.compare_and_set(expected, updated).await
    }

    async fn pending(&self) -> Result<Vec<CreditRequest>> {
        self.inner.pending().await
    }
}

/// Fails `append` while armed.
#[derive(Clone, Default)]
pub struct FaultySettlementStore {
    inner: InMemorySettlementStore,
    pub fault: Fault,
}

#[async_trait]
impl SettlementStore for FaultySettlementStore {
    async fn append(&self, record: SettlementRecord) -> Result<()> {
        self.fault.check("settlement log")?;
        self.inner.append(record).await
    }

    async fn next_id(&self) -> Result<u64> {
        self.inner.next_id().await
    }

    async fn history(&self, player_id: PlayerId) -> Result<Vec<SettlementRecord>> {
        self.inner.history(player_id).await
    }
}
