use super::PlayerId;
use super::RequestId;
use super::ledger::PlayerLedger;
use super::request::{CreditRequest, RequestStatus};
use super::settlement::SettlementRecord;
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn store(&self, ledger: PlayerLedger) -> Result<()>;
    async fn get(&self, player_id: PlayerId) -> Result<Option<PlayerLedger>>;
    async fn get_all(&self) -> Result<Vec<PlayerLedger>>;
}

#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Reserves the next request id. Ids start at 1 and are never reused.
    async fn next_id(&self) -> Result<RequestId>;
    async fn insert(&self, request: CreditRequest) -> Result<()>;
    async fn get(&self, request_id: RequestId) -> Result<Option<CreditRequest>>;
    /// Replaces the stored request with `updated` only if its status is still
    /// `expected`. Returns whether the swap happened.
    async fn compare_and_set(
        &self,
        expected: RequestStatus,
        updated: CreditRequest,
    ) -> Result<bool>;
    async fn pending(&self) -> Result<Vec<CreditRequest>>;
}

#[async_trait]
pub trait SettlementStore: Send + Sync {
    async fn append(&self, record: SettlementRecord) -> Result<()>;
    async fn next_id(&self) -> Result<u64>;
    async fn history(&self, player_id: PlayerId) -> Result<Vec<SettlementRecord>>;
}

pub type LedgerStoreBox = Box<dyn LedgerStore>;
pub type RequestStoreBox = Box<dyn RequestStore>;
pub type SettlementStoreBox = Box<dyn SettlementStore>;
