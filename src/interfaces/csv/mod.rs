//! CSV command scripts in, ledger reports out.

pub mod command_reader;
pub mod ledger_writer;
