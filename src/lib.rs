//! Credit issuance, approval and settlement for player credit lines.
//!
//! The crate is split the same way at every level: `domain` holds value types,
//! invariants and storage ports, `application` orchestrates them under
//! per-player locks, `infrastructure` provides the storage adapters and
//! `interfaces` the CSV command driver.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
