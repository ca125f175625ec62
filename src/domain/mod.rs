//! Domain model for credit issuance and settlement.
//!
//! Everything in here is synchronous and free of I/O: value objects, the
//! per-player ledger, request state, the issuance policy and the persistence
//! ports the application layer drives.

pub mod chips;
pub mod identity;
pub mod ledger;
pub mod money;
pub mod policy;
pub mod ports;
pub mod request;
pub mod settlement;

pub type PlayerId = u32;
pub type RequestId = u64;
pub type CallerId = u32;
