#![allow(dead_code)]

use credit_engine::application::config::EngineConfig;
use credit_engine::application::engine::CreditEngine;
use credit_engine::domain::PlayerId;
use credit_engine::domain::chips::ChipBreakdown;
use credit_engine::domain::identity::Caller;
use credit_engine::domain::money::{Amount, Balance};
use credit_engine::infrastructure::in_memory::{
    InMemoryLedgerStore, InMemoryRequestStore, InMemorySettlementStore,
};
use rust_decimal::Decimal;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

pub const HEADER: &str = "op,caller,role,allowance,player,request,amount,chips,mode,evidence,notes";

pub fn engine() -> CreditEngine {
    CreditEngine::new(
        Box::new(InMemoryLedgerStore::new()),
        Box::new(InMemoryRequestStore::new()),
        Box::new(InMemorySettlementStore::new()),
    )
}

/// An engine tuned so racing tasks wait for the lock instead of failing fast.
pub fn patient_engine() -> CreditEngine {
    CreditEngine::with_config(
        Box::new(InMemoryLedgerStore::new()),
        Box::new(InMemoryRequestStore::new()),
        Box::new(InMemorySettlementStore::new()),
        EngineConfig {
            lock_attempts: 10_000,
            lock_backoff: Duration::from_micros(100),
            lock_backoff_max: Duration::from_millis(2),
        },
    )
}

pub fn admin() -> Caller {
    Caller::admin(1)
}

pub fn cashier(allowance: Decimal) -> Caller {
    Caller::cashier(2, Some(Amount::new(allowance).unwrap()))
}

pub fn chips(s: &str) -> ChipBreakdown {
    s.parse().unwrap()
}

pub async fn outstanding(engine: &CreditEngine, player_id: PlayerId) -> Balance {
    engine
        .get_credit_status(&admin(), player_id)
        .await
        .unwrap()
        .total_outstanding
}

/// Writes a command script with the standard header to a temp file.
pub fn command_file(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", HEADER).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file.flush().unwrap();
    file
}
