use crate::domain::money::{Amount, Balance};
use crate::domain::{CallerId, PlayerId};
use crate::error::SettlementError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a settlement was paid. Online payments name the receiving bank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PaymentMode {
    Cash,
    Online { bank: String },
}

impl PaymentMode {
    pub fn is_online(&self) -> bool {
        matches!(self, PaymentMode::Online { .. })
    }
}

impl FromStr for PaymentMode {
    type Err = SettlementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = s.trim().to_ascii_lowercase();
        if mode == "cash" {
            return Ok(PaymentMode::Cash);
        }
        match mode.strip_prefix("online_") {
            Some(bank) if !bank.is_empty() => Ok(PaymentMode::Online {
                bank: bank.to_string(),
            }),
            _ => Err(SettlementError::UnknownPaymentMode {
                mode: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for PaymentMode {
    type Error = SettlementError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PaymentMode> for String {
    fn from(mode: PaymentMode) -> Self {
        mode.to_string()
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMode::Cash => f.write_str("cash"),
            PaymentMode::Online { bank } => write!(f, "online_{}", bank),
        }
    }
}

/// Opaque token handed back by the evidence store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvidenceRef(String);

impl EvidenceRef {
    /// Blank references count as no evidence at all.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// What the caller gets back from a successful settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    pub remaining_credit: Balance,
    pub fully_settled: bool,
}

/// An applied payment. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub id: u64,
    pub player_id: PlayerId,
    pub amount: Amount,
    pub payment_mode: PaymentMode,
    pub evidence_ref: Option<EvidenceRef>,
    pub notes: String,
    pub settled_by: CallerId,
    pub remaining_credit_after: Balance,
    pub created_at: DateTime<Utc>,
}
