use crate::application::ledger::LedgerAccounts;
use crate::domain::chips::{self, ChipBreakdown};
use crate::domain::identity::Caller;
use crate::domain::ledger::IssueAuthority;
use crate::domain::money::Amount;
use crate::domain::policy;
use crate::domain::ports::RequestStoreBox;
use crate::domain::request::{ApprovalType, CreditRequest, Decision, RequestStatus};
use crate::domain::{CallerId, PlayerId, RequestId};
use crate::error::{CreditError, Result, WorkflowError};
use chrono::Utc;
use log::{debug, error, info};
use rust_decimal::Decimal;

/// Drives a credit request from submission to its single decision.
pub struct ApprovalWorkflow {
    requests: RequestStoreBox,
}

impl ApprovalWorkflow {
    pub fn new(requests: RequestStoreBox) -> Self {
        Self { requests }
    }

    /// Validates, classifies and records a new request.
    ///
    /// The policy decision and any instant issuance happen under the player's
    /// lock, so two concurrent submissions cannot both fit under the same
    /// headroom.
    pub async fn submit(
        &self,
        ledger: &LedgerAccounts,
        caller: &Caller,
        player_id: PlayerId,
        requested_amount: Decimal,
        chip_breakdown: ChipBreakdown,
        notes: &str,
    ) -> Result<CreditRequest> {
        let amount = Amount::new(requested_amount)?;
        chips::validate(&chip_breakdown, amount.value())?;

        let guard = ledger.lock(player_id).await?;
        let player = ledger.require(player_id).await?;
        let approval_type = policy::decide(&player, caller.cashier_remaining_limit(), amount)?;
        debug!(
            "request of {} for player {} by caller {} classified {:?} (outstanding {}, limit {})",
            amount,
            player_id,
            caller.id,
            approval_type,
            player.outstanding_credit,
            player.credit_limit
        );

        let id = self.requests.next_id().await?;
        let request = CreditRequest::submitted(
            id,
            player_id,
            amount,
            chip_breakdown,
            approval_type,
            caller.id,
            notes.trim().to_string(),
            Utc::now(),
        );

        if approval_type != ApprovalType::Instant {
            self.requests.insert(request.clone()).await?;
            info!(
                "request {} for {} to player {} queued for admin review",
                id, amount, player_id
            );
            return Ok(request);
        }

        let update = ledger
            .update_locked(&guard, player_id, |l| {
                Ok(l.credit_issue(amount, IssueAuthority::Policy)?)
            })
            .await?;
        if let Err(e) = self.requests.insert(request.clone()).await {
            error!(
                "could not record instant request {} for player {}, reverting issuance: {}",
                id, player_id, e
            );
            ledger.restore_locked(&guard, update.before).await;
            return Err(e);
        }
        info!(
            "request {} auto-approved: issued {} to player {}, outstanding now {}",
            id, amount, player_id, update.after.outstanding_credit
        );
        Ok(request)
    }

    pub async fn approve(
        &self,
        ledger: &LedgerAccounts,
        request_id: RequestId,
        approver_id: CallerId,
        notes: &str,
    ) -> Result<CreditRequest> {
        let request = self.pending_request(request_id, notes).await?;
        let guard = ledger.lock(request.player_id).await?;

        let decided = request.decided(Decision::Approve, approver_id, notes, Utc::now());
        self.claim(&decided).await?;

        let amount = request.requested_amount;
        match ledger
            .update_locked(&guard, request.player_id, |l| {
                Ok(l.credit_issue(amount, IssueAuthority::AdminOverride)?)
            })
            .await
        {
            Ok(update) => {
                info!(
                    "request {} approved by {}: issued {} to player {}, outstanding now {}",
                    request_id,
                    approver_id,
                    amount,
                    request.player_id,
                    update.after.outstanding_credit
                );
                Ok(decided)
            }
            Err(e) => {
                error!(
                    "ledger write failed for approved request {}, returning it to pending: {}",
                    request_id, e
                );
                match self
                    .requests
                    .compare_and_set(RequestStatus::Approved, request)
                    .await
                {
                    Ok(true) => {}
                    Ok(false) => error!("request {} changed while reverting approval", request_id),
                    Err(revert) => error!("could not revert request {}: {}", request_id, revert),
                }
                Err(e)
            }
        }
    }

    pub async fn reject(
        &self,
        request_id: RequestId,
        approver_id: CallerId,
        notes: &str,
    ) -> Result<CreditRequest> {
        let request = self.pending_request(request_id, notes).await?;
        let decided = request.decided(Decision::Reject, approver_id, notes, Utc::now());
        self.claim(&decided).await?;
        info!(
            "request {} for player {} rejected by {}",
            request_id, request.player_id, approver_id
        );
        Ok(decided)
    }

    pub async fn pending(&self) -> Result<Vec<CreditRequest>> {
        self.requests.pending().await
    }

    /// Loads a request and checks it can still be decided with these notes.
    async fn pending_request(&self, request_id: RequestId, notes: &str) -> Result<CreditRequest> {
        let request = self
            .requests
            .get(request_id)
            .await?
            .ok_or(WorkflowError::RequestNotFound { request_id })?;
        if request.status.is_terminal() {
            return Err(WorkflowError::NotPending {
                request_id,
                status: request.status,
            }
            .into());
        }
        if notes.trim().is_empty() {
            return Err(WorkflowError::NotesRequired { request_id }.into());
        }
        Ok(request)
    }

    /// Atomically moves the request out of `pending`. Losing a race surfaces
    /// as `NotPending` with whatever status the winner wrote.
    async fn claim(&self, decided: &CreditRequest) -> Result<()> {
        if self
            .requests
            .compare_and_set(RequestStatus::Pending, decided.clone())
            .await?
        {
            return Ok(());
        }
        let status = self
            .requests
            .get(decided.id)
            .await?
            .map(|r| r.status)
            .unwrap_or(decided.status);
        debug!("lost decision race on request {} (now {})", decided.id, status);
        Err(CreditError::from(WorkflowError::NotPending {
            request_id: decided.id,
            status,
        }))
    }
}
