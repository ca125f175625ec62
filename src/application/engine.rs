use crate::application::config::EngineConfig;
use crate::application::ledger::LedgerAccounts;
use crate::application::settlement::SettlementProcessor;
use crate::application::workflow::ApprovalWorkflow;
use crate::domain::chips::ChipBreakdown;
use crate::domain::identity::{Action, Caller};
use crate::domain::ledger::{CreditStatus, PlayerLedger};
use crate::domain::ports::{LedgerStoreBox, RequestStoreBox, SettlementStoreBox};
use crate::domain::request::{CreditRequest, Decision};
use crate::domain::settlement::{SettlementReceipt, SettlementRecord};
use crate::domain::{PlayerId, RequestId};
use crate::error::Result;
use rust_decimal::Decimal;

/// The main entry point for credit operations.
///
/// `CreditEngine` owns the storage backends and exposes the operations the
/// surrounding API layer calls. Every call takes the acting [`Caller`]
/// explicitly, and authorization is checked before any state is touched.
/// The engine is `Send + Sync`; share it behind an `Arc`.
pub struct CreditEngine {
    ledger: LedgerAccounts,
    workflow: ApprovalWorkflow,
    settlements: SettlementProcessor,
}

impl CreditEngine {
    /// Creates a new `CreditEngine` with the default [`EngineConfig`].
    ///
    /// # Arguments
    ///
    /// * `ledger_store` - The store for player ledgers.
    /// * `request_store` - The store for credit requests.
    /// * `settlement_store` - The append-only settlement log.
    pub fn new(
        ledger_store: LedgerStoreBox,
        request_store: RequestStoreBox,
        settlement_store: SettlementStoreBox,
    ) -> Self {
        Self::with_config(
            ledger_store,
            request_store,
            settlement_store,
            EngineConfig::default(),
        )
    }

    pub fn with_config(
        ledger_store: LedgerStoreBox,
        request_store: RequestStoreBox,
        settlement_store: SettlementStoreBox,
        config: EngineConfig,
    ) -> Self {
        Self {
            ledger: LedgerAccounts::new(ledger_store, config),
            workflow: ApprovalWorkflow::new(request_store),
            settlements: SettlementProcessor::new(settlement_store),
        }
    }

    /// Submits a credit request on behalf of `caller`.
    ///
    /// Instant requests are credited before this returns; admin-required ones
    /// come back `pending`.
    pub async fn create_request(
        &self,
        caller: &Caller,
        player_id: PlayerId,
        requested_amount: Decimal,
        chip_breakdown: ChipBreakdown,
        notes: &str,
    ) -> Result<CreditRequest> {
        caller.authorize(Action::CreateRequest)?;
        self.workflow
            .submit(
                &self.ledger,
                caller,
                player_id,
                requested_amount,
                chip_breakdown,
                notes,
            )
            .await
    }

    /// Approves or rejects a pending request. Only one decision per request
    /// can ever succeed.
    pub async fn decide(
        &self,
        caller: &Caller,
        request_id: RequestId,
        decision: Decision,
        notes: &str,
    ) -> Result<CreditRequest> {
        caller.authorize(Action::Decide)?;
        match decision {
            Decision::Approve => {
                self.workflow
                    .approve(&self.ledger, request_id, caller.id, notes)
                    .await
            }
            Decision::Reject => self.workflow.reject(request_id, caller.id, notes).await,
        }
    }

    /// Applies a payment against a player's outstanding credit.
    ///
    /// `payment_mode` is `cash` or `online_<bank>`; online payments need an
    /// `evidence_ref` from the evidence store.
    pub async fn settle(
        &self,
        caller: &Caller,
        player_id: PlayerId,
        amount: Decimal,
        payment_mode: &str,
        evidence_ref: Option<&str>,
        notes: &str,
    ) -> Result<SettlementReceipt> {
        caller.authorize(Action::Settle)?;
        self.settlements
            .settle(
                &self.ledger,
                caller.id,
                player_id,
                amount,
                payment_mode,
                evidence_ref,
                notes,
            )
            .await
    }

    pub async fn get_credit_status(
        &self,
        caller: &Caller,
        player_id: PlayerId,
    ) -> Result<CreditStatus> {
        caller.authorize(Action::ViewPlayer(player_id))?;
        self.ledger.status(player_id).await
    }

    pub async fn set_credit_limit(
        &self,
        caller: &Caller,
        player_id: PlayerId,
        new_limit: Decimal,
    ) -> Result<()> {
        caller.authorize(Action::SetCreditLimit)?;
        self.ledger.set_credit_limit(player_id, new_limit).await?;
        Ok(())
    }

    /// Requests awaiting an admin decision, oldest first.
    pub async fn pending_requests(&self, caller: &Caller) -> Result<Vec<CreditRequest>> {
        caller.authorize(Action::ReviewQueue)?;
        self.workflow.pending().await
    }

    pub async fn settlement_history(
        &self,
        caller: &Caller,
        player_id: PlayerId,
    ) -> Result<Vec<SettlementRecord>> {
        caller.authorize(Action::ViewPlayer(player_id))?;
        self.settlements.history(player_id).await
    }

    /// Every ledger, ordered by player id.
    pub async fn ledgers(&self) -> Result<Vec<PlayerLedger>> {
        self.ledger.all().await
    }
}
