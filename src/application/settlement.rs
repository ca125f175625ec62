use crate::application::ledger::LedgerAccounts;
use crate::domain::money::Amount;
use crate::domain::ports::SettlementStoreBox;
use crate::domain::settlement::{EvidenceRef, PaymentMode, SettlementReceipt, SettlementRecord};
use crate::domain::{CallerId, PlayerId};
use crate::error::{CreditError, Result, SettlementError};
use chrono::Utc;
use log::{error, info};
use rust_decimal::Decimal;

/// Applies payments against player ledgers and keeps the settlement log.
pub struct SettlementProcessor {
    records: SettlementStoreBox,
}

impl SettlementProcessor {
    pub fn new(records: SettlementStoreBox) -> Self {
        Self { records }
    }

    /// Checks the payment, reduces the ledger and appends an immutable record.
    ///
    /// Every settlement-level check runs before the ledger is touched. The
    /// evidence token is only kept for online payments.
    #[allow(clippy::too_many_arguments)]
    pub async fn settle(
        &self,
        ledger: &LedgerAccounts,
        settled_by: CallerId,
        player_id: PlayerId,
        amount: Decimal,
        payment_mode: &str,
        evidence_ref: Option<&str>,
        notes: &str,
    ) -> Result<SettlementReceipt> {
        let amount = Amount::new(amount)
            .map_err(|_| SettlementError::InvalidAmount { player_id, amount })?;
        let payment_mode: PaymentMode = payment_mode.parse()?;
        let evidence_ref = evidence_ref.and_then(EvidenceRef::new);
        if payment_mode.is_online() && evidence_ref.is_none() {
            return Err(SettlementError::EvidenceRequired {
                player_id,
                mode: payment_mode.to_string(),
            }
            .into());
        }
        let evidence_ref = if payment_mode.is_online() {
            evidence_ref
        } else {
            None
        };

        let guard = ledger.lock(player_id).await?;
        let update = ledger
            .update_locked(&guard, player_id, |l| Ok(l.credit_settle(amount)?))
            .await?;
        let outcome = update.value;

        // Ids are reserved only after the ledger accepted the payment.
        let recorded = async {
            let id = self.records.next_id().await?;
            self.records
                .append(SettlementRecord {
                    id,
                    player_id,
                    amount,
                    payment_mode,
                    evidence_ref,
                    notes: notes.trim().to_string(),
                    settled_by,
                    remaining_credit_after: outcome.remaining_credit,
                    created_at: Utc::now(),
                })
                .await?;
            Ok::<_, CreditError>(id)
        }
        .await;
        let id = match recorded {
            Ok(id) => id,
            Err(e) => {
                error!(
                    "could not record settlement of {} for player {}, reverting ledger: {}",
                    amount, player_id, e
                );
                ledger.restore_locked(&guard, update.before).await;
                return Err(e);
            }
        };

        info!(
            "settlement {}: {} for player {} by {}, remaining {}{}",
            id,
            amount,
            player_id,
            settled_by,
            outcome.remaining_credit,
            if outcome.fully_settled {
                " (fully settled)"
            } else {
                ""
            }
        );
        Ok(SettlementReceipt {
            remaining_credit: outcome.remaining_credit,
            fully_settled: outcome.fully_settled,
        })
    }

    pub async fn history(&self, player_id: PlayerId) -> Result<Vec<SettlementRecord>> {
        self.records.history(player_id).await
    }
}
