use crate::domain::chips::ChipBreakdown;
use crate::domain::identity::{Caller, Role};
use crate::domain::money::Amount;
use crate::domain::request::Decision;
use crate::domain::{CallerId, PlayerId, RequestId};
use crate::error::{CreditError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;
use std::str::FromStr;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    Limit,
    Request,
    Approve,
    Reject,
    Settle,
    Status,
}

/// One raw row of a command script.
///
/// Amounts stay textual here so they are parsed as exact decimals rather than
/// going through a float on the way in.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CommandRecord {
    pub op: Op,
    pub caller: CallerId,
    pub role: Role,
    pub allowance: Option<String>,
    pub player: Option<PlayerId>,
    pub request: Option<RequestId>,
    pub amount: Option<String>,
    pub chips: Option<String>,
    pub mode: Option<String>,
    pub evidence: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Command {
    SetLimit {
        player_id: PlayerId,
        limit: Decimal,
    },
    Request {
        player_id: PlayerId,
        amount: Decimal,
        chips: ChipBreakdown,
        notes: String,
    },
    Decide {
        request_id: RequestId,
        decision: Decision,
        notes: String,
    },
    Settle {
        player_id: PlayerId,
        amount: Decimal,
        mode: String,
        evidence: Option<String>,
        notes: String,
    },
    Status {
        player_id: PlayerId,
    },
}

/// A parsed command together with who issues it and where it came from.
#[derive(Debug, PartialEq, Clone)]
pub struct ScriptedCall {
    pub row: usize,
    pub caller: Caller,
    pub command: Command,
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.trim().is_empty())
}

impl CommandRecord {
    pub fn into_call(self, row: usize) -> Result<ScriptedCall> {
        let invalid = |message: String| CreditError::InvalidCommand { row, message };
        let require = |field: Option<String>, name: &str| {
            non_empty(field).ok_or_else(|| invalid(format!("missing `{}`", name)))
        };
        let decimal = |field: Option<String>, name: &str| -> Result<Decimal> {
            let raw = require(field, name)?;
            Decimal::from_str(raw.trim())
                .map_err(|e| invalid(format!("bad `{}` value `{}`: {}", name, raw, e)))
        };
        let player =
            |player: Option<PlayerId>| player.ok_or_else(|| invalid("missing `player`".into()));

        let issue_allowance = match non_empty(self.allowance) {
            Some(raw) => {
                let value = Decimal::from_str(raw.trim())
                    .map_err(|e| invalid(format!("bad `allowance` value `{}`: {}", raw, e)))?;
                Some(Amount::new(value)?)
            }
            None => None,
        };
        let caller = Caller {
            id: self.caller,
            role: self.role,
            issue_allowance,
        };
        let notes = self.notes.unwrap_or_default();

        let command = match self.op {
            Op::Limit => Command::SetLimit {
                player_id: player(self.player)?,
                limit: decimal(self.amount, "amount")?,
            },
            Op::Request => Command::Request {
                player_id: player(self.player)?,
                amount: decimal(self.amount, "amount")?,
                chips: non_empty(self.chips)
                    .map(|c| c.parse::<ChipBreakdown>())
                    .transpose()?
                    .unwrap_or_default(),
                notes,
            },
            Op::Approve | Op::Reject => Command::Decide {
                request_id: self
                    .request
                    .ok_or_else(|| invalid("missing `request`".into()))?,
                decision: if self.op == Op::Approve {
                    Decision::Approve
                } else {
                    Decision::Reject
                },
                notes,
            },
            Op::Settle => Command::Settle {
                player_id: player(self.player)?,
                amount: decimal(self.amount, "amount")?,
                mode: require(self.mode, "mode")?,
                evidence: non_empty(self.evidence),
                notes,
            },
            Op::Status => Command::Status {
                player_id: player(self.player)?,
            },
        };

        Ok(ScriptedCall {
            row,
            caller,
            command,
        })
    }
}

/// Reads credit commands from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over
/// `Result<ScriptedCall>`. It handles whitespace trimming and flexible record
/// lengths automatically, so trailing optional columns may be omitted.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and parses commands. Row numbers
    /// are 1-based and count the header row.
    pub fn commands(self) -> impl Iterator<Item = Result<ScriptedCall>> {
        self.reader
            .into_deserialize::<CommandRecord>()
            .enumerate()
            .map(|(idx, result)| {
                let row = idx + 2;
                result
                    .map_err(|e| CreditError::InvalidCommand {
                        row,
                        message: e.to_string(),
                    })
                    .and_then(|record| record.into_call(row))
            })
    }
}
