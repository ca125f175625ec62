use crate::domain::PlayerId;
use crate::domain::ledger::PlayerLedger;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

/// Flattened report row for one player.
#[derive(Debug, Serialize, PartialEq)]
pub struct LedgerRow {
    pub player: PlayerId,
    pub credit_limit: Decimal,
    pub outstanding_credit: Decimal,
    pub available_credit: Decimal,
}

impl From<&PlayerLedger> for LedgerRow {
    fn from(ledger: &PlayerLedger) -> Self {
        Self {
            player: ledger.player_id,
            credit_limit: ledger.credit_limit.value().normalize(),
            outstanding_credit: ledger.outstanding_credit.value().normalize(),
            available_credit: ledger.available_credit().value().normalize(),
        }
    }
}

/// Writes ledger reports as CSV (one row per player) or as a JSON array.
pub struct LedgerWriter<W: Write> {
    writer: W,
}

impl<W: Write> LedgerWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_csv(self, ledgers: &[PlayerLedger]) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(self.writer);
        if ledgers.is_empty() {
            wtr.write_record([
                "player",
                "credit_limit",
                "outstanding_credit",
                "available_credit",
            ])?;
        }
        for ledger in ledgers {
            wtr.serialize(LedgerRow::from(ledger))?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_json(mut self, ledgers: &[PlayerLedger]) -> Result<()> {
        let rows: Vec<LedgerRow> = ledgers.iter().map(LedgerRow::from).collect();
        serde_json::to_writer_pretty(&mut self.writer, &rows)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
