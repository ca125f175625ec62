use crate::domain::ledger::PlayerLedger;
use crate::domain::ports::{LedgerStore, RequestStore, SettlementStore};
use crate::domain::request::{CreditRequest, RequestStatus};
use crate::domain::settlement::SettlementRecord;
use crate::domain::{PlayerId, RequestId};
use crate::error::{CreditError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for player ledgers.
pub const CF_LEDGERS: &str = "ledgers";
/// Column Family for credit requests.
pub const CF_REQUESTS: &str = "requests";
/// Column Family for the append-only settlement log.
pub const CF_SETTLEMENTS: &str = "settlements";
/// Column Family for id sequences.
pub const CF_META: &str = "meta";

const REQUEST_SEQUENCE: &[u8] = b"request_seq";
const SETTLEMENT_SEQUENCE: &[u8] = b"settlement_seq";

/// A persistent store implementation using RocksDB.
///
/// Ledgers, requests and settlements live in separate Column Families.
/// Read-compare-write sequences (request status CAS, id allocation) are
/// serialized through `write_guard`, which is shared by every clone.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_guard: Arc<Mutex<()>>,
}

fn missing_cf(name: &str) -> CreditError {
    CreditError::storage(std::io::Error::other(format!(
        "{} column family not found",
        name
    )))
}

/// Settlement keys sort by player, then by sequence, so one player's history
/// is a contiguous prefix scan.
fn settlement_key(player_id: PlayerId, id: u64) -> [u8; 12] {
    let mut key = [0u8; 12];
    key[..4].copy_from_slice(&player_id.to_be_bytes());
    key[4..].copy_from_slice(&id.to_be_bytes());
    key
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that all required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = [CF_LEDGERS, CF_REQUESTS, CF_SETTLEMENTS, CF_META]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = DB::open_cf_descriptors(&opts, path, cfs)?;

        Ok(Self {
            db: Arc::new(db),
            write_guard: Arc::new(Mutex::new(())),
        })
    }

    fn put_json<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.db.cf_handle(cf_name).ok_or_else(|| missing_cf(cf_name))?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(&cf, key, bytes)?;
        Ok(())
    }

    fn get_json<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.db.cf_handle(cf_name).ok_or_else(|| missing_cf(cf_name))?;
        match self.db.get_pinned_cf(&cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan_json<T: DeserializeOwned>(&self, cf_name: &str, prefix: &[u8]) -> Result<Vec<T>> {
        let cf = self.db.cf_handle(cf_name).ok_or_else(|| missing_cf(cf_name))?;
        let mode = if prefix.is_empty() {
            IteratorMode::Start
        } else {
            IteratorMode::From(prefix, Direction::Forward)
        };

        let mut values = Vec::new();
        for item in self.db.iterator_cf(cf, mode) {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }

    async fn next_in_sequence(&self, name: &[u8]) -> Result<u64> {
        let _guard = self.write_guard.lock().await;
        let cf = self.db.cf_handle(CF_META).ok_or_else(|| missing_cf(CF_META))?;
        let current = match self.db.get_pinned_cf(&cf, name)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_ref().try_into().map_err(|_| {
                    CreditError::storage(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        "corrupt sequence counter",
                    ))
                })?;
                u64::from_be_bytes(raw)
            }
            None => 0,
        };
        let next = current + 1;
        self.db.put_cf(&cf, name, next.to_be_bytes())?;
        Ok(next)
    }
}

#[async_trait]
impl LedgerStore for RocksDBStore {
    async fn store(&self, ledger: PlayerLedger) -> Result<()> {
        self.put_json(CF_LEDGERS, &ledger.player_id.to_be_bytes(), &ledger)
    }

    async fn get(&self, player_id: PlayerId) -> Result<Option<PlayerLedger>> {
        self.get_json(CF_LEDGERS, &player_id.to_be_bytes())
    }

    async fn get_all(&self) -> Result<Vec<PlayerLedger>> {
        // Big-endian keys iterate in player order.
        self.scan_json(CF_LEDGERS, &[])
    }
}

#[async_trait]
impl RequestStore for RocksDBStore {
    async fn next_id(&self) -> Result<RequestId> {
        self.next_in_sequence(REQUEST_SEQUENCE).await
    }

    async fn insert(&self, request: CreditRequest) -> Result<()> {
        self.put_json(CF_REQUESTS, &request.id.to_be_bytes(), &request)
    }

    async fn get(&self, request_id: RequestId) -> Result<Option<CreditRequest>> {
        self.get_json(CF_REQUESTS, &request_id.to_be_bytes())
    }

    async fn compare_and_set(
        &self,
        expected: RequestStatus,
        updated: CreditRequest,
    ) -> Result<bool> {
        let _guard = self.write_guard.lock().await;
        let key = updated.id.to_be_bytes();
        let current: Option<CreditRequest> = self.get_json(CF_REQUESTS, &key)?;
        match current {
            Some(current) if current.status == expected => {
                self.put_json(CF_REQUESTS, &key, &updated)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn pending(&self) -> Result<Vec<CreditRequest>> {
        let all: Vec<CreditRequest> = self.scan_json(CF_REQUESTS, &[])?;
        Ok(all.into_iter().filter(|r| r.is_pending()).collect())
    }
}

#[async_trait]
impl SettlementStore for RocksDBStore {
    async fn append(&self, record: SettlementRecord) -> Result<()> {
        let key = settlement_key(record.player_id, record.id);
        self.put_json(CF_SETTLEMENTS, &key, &record)
    }

    async fn next_id(&self) -> Result<u64> {
        self.next_in_sequence(SETTLEMENT_SEQUENCE).await
    }

    async fn history(&self, player_id: PlayerId) -> Result<Vec<SettlementRecord>> {
        self.scan_json(CF_SETTLEMENTS, &player_id.to_be_bytes())
    }
}
