use crate::domain::PlayerId;
use crate::domain::money::{Amount, Balance};
use crate::error::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which path is asking for credit to be issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueAuthority {
    /// Auto-approval; must stay within the credit limit.
    Policy,
    /// An admin approved the request and may authorize an excess.
    AdminOverride,
}

/// Result of applying a settlement to a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettleOutcome {
    pub remaining_credit: Balance,
    pub fully_settled: bool,
}

/// Snapshot returned by credit status queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditStatus {
    pub credit_limit: Balance,
    pub total_outstanding: Balance,
    pub available_credit: Balance,
}

/// A player's credit position.
///
/// `outstanding_credit <= credit_limit` holds except after an admin override,
/// or after the limit is lowered below what is already outstanding. Neither
/// case is corrected retroactively; both just block further auto-issuance.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct PlayerLedger {
    /// The unique identifier for the player.
    pub player_id: PlayerId,
    /// Maximum outstanding credit authorized for the player.
    pub credit_limit: Balance,
    /// Credit issued and not yet settled.
    pub outstanding_credit: Balance,
}

impl PlayerLedger {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            credit_limit: Balance::ZERO,
            outstanding_credit: Balance::ZERO,
        }
    }

    pub fn with_limit(player_id: PlayerId, credit_limit: Balance) -> Self {
        Self {
            credit_limit,
            ..Self::new(player_id)
        }
    }

    pub fn available_credit(&self) -> Balance {
        self.credit_limit - self.outstanding_credit
    }

    pub fn status(&self) -> CreditStatus {
        CreditStatus {
            credit_limit: self.credit_limit,
            total_outstanding: self.outstanding_credit,
            available_credit: self.available_credit(),
        }
    }

    /// Adds `amount` to the outstanding credit.
    pub fn credit_issue(
        &mut self,
        amount: Amount,
        authority: IssueAuthority,
    ) -> Result<(), LedgerError> {
        let projected = self.outstanding_credit.checked_add(amount).ok_or(
            LedgerError::BalanceOverflow {
                player_id: self.player_id,
                amount: amount.value(),
                outstanding: self.outstanding_credit.value(),
            },
        )?;
        if authority == IssueAuthority::Policy && projected > self.credit_limit {
            return Err(LedgerError::LimitExceeded {
                player_id: self.player_id,
                amount: amount.value(),
                projected: projected.value(),
                credit_limit: self.credit_limit.value(),
            });
        }
        self.outstanding_credit = projected;
        Ok(())
    }

    /// Pays down outstanding credit. Leaves the ledger untouched on error.
    pub fn credit_settle(&mut self, amount: Amount) -> Result<SettleOutcome, LedgerError> {
        if Balance::from(amount) > self.outstanding_credit {
            return Err(LedgerError::OverSettlement {
                player_id: self.player_id,
                amount: amount.value(),
                outstanding: self.outstanding_credit.value(),
            });
        }
        self.outstanding_credit = self.outstanding_credit - amount;
        Ok(SettleOutcome {
            remaining_credit: self.outstanding_credit,
            fully_settled: self.outstanding_credit.is_zero(),
        })
    }

    pub fn set_credit_limit(&mut self, new_limit: Decimal) -> Result<(), LedgerError> {
        if new_limit < Decimal::ZERO {
            return Err(LedgerError::NegativeLimit {
                player_id: self.player_id,
                new_limit,
            });
        }
        self.credit_limit = Balance::new(new_limit);
        Ok(())
    }
}
