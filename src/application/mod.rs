//! Application layer orchestrating the credit lifecycle.
//!
//! [`engine::CreditEngine`] is the entry point. It composes the per-player
//! [`ledger::LedgerAccounts`], the request [`workflow::ApprovalWorkflow`] and
//! the [`settlement::SettlementProcessor`], all built on async storage ports
//! and a per-player lock registry.

pub mod config;
pub mod engine;
pub mod ledger;
pub mod locks;
pub mod settlement;
pub mod workflow;
