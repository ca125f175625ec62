use crate::application::config::EngineConfig;
use crate::application::locks::{PlayerGuard, PlayerLocks};
use crate::domain::PlayerId;
use crate::domain::ledger::{CreditStatus, IssueAuthority, PlayerLedger, SettleOutcome};
use crate::domain::money::{self, Amount};
use crate::domain::ports::LedgerStoreBox;
use crate::error::{PolicyError, Result};
use log::{error, info};
use rust_decimal::Decimal;

/// A committed ledger change, with the prior state kept for compensation.
#[derive(Debug, Clone)]
pub struct LedgerUpdate<T> {
    pub before: PlayerLedger,
    pub after: PlayerLedger,
    pub value: T,
}

/// Owns the ledger store and serializes every mutation per player.
///
/// The `*_locked` methods take a [`PlayerGuard`] as proof that the caller
/// already holds the player's lock; they are how multi-step operations
/// (instant issuance, approval, settlement) keep one critical section.
pub struct LedgerAccounts {
    store: LedgerStoreBox,
    locks: PlayerLocks,
    config: EngineConfig,
}

impl LedgerAccounts {
    pub fn new(store: LedgerStoreBox, config: EngineConfig) -> Self {
        Self {
            store,
            locks: PlayerLocks::new(),
            config,
        }
    }

    pub async fn lock(&self, player_id: PlayerId) -> Result<PlayerGuard> {
        self.locks.acquire(player_id, &self.config).await
    }

    /// Loads a ledger, failing when the player has never been given a limit.
    pub async fn require(&self, player_id: PlayerId) -> Result<PlayerLedger> {
        self.store
            .get(player_id)
            .await?
            .ok_or_else(|| PolicyError::UnknownPlayer { player_id }.into())
    }

    /// Applies `f` to a copy of the ledger and stores it only if `f` succeeds,
    /// so a rejected change never leaves a partial update behind.
    pub async fn update_locked<T, F>(
        &self,
        _guard: &PlayerGuard,
        player_id: PlayerId,
        f: F,
    ) -> Result<LedgerUpdate<T>>
    where
        F: FnOnce(&mut PlayerLedger) -> Result<T>,
    {
        let before = self.require(player_id).await?;
        let mut after = before.clone();
        let value = f(&mut after)?;
        self.store.store(after.clone()).await?;
        Ok(LedgerUpdate {
            before,
            after,
            value,
        })
    }

    /// Puts back the state captured before a change whose follow-up write failed.
    pub async fn restore_locked(&self, _guard: &PlayerGuard, before: PlayerLedger) {
        let player_id = before.player_id;
        if let Err(e) = self.store.store(before).await {
            error!(
                "failed to restore ledger for player {} after a partial write: {}",
                player_id, e
            );
        }
    }

    pub async fn credit_issue(
        &self,
        player_id: PlayerId,
        amount: Amount,
        authority: IssueAuthority,
    ) -> Result<PlayerLedger> {
        let guard = self.lock(player_id).await?;
        let update = self
            .update_locked(&guard, player_id, |ledger| {
                Ok(ledger.credit_issue(amount, authority)?)
            })
            .await?;
        info!(
            "issued {} to player {} ({:?}), outstanding now {}",
            amount, player_id, authority, update.after.outstanding_credit
        );
        Ok(update.after)
    }

    pub async fn credit_settle(&self, player_id: PlayerId, amount: Amount) -> Result<SettleOutcome> {
        let guard = self.lock(player_id).await?;
        let update = self
            .update_locked(&guard, player_id, |ledger| Ok(ledger.credit_settle(amount)?))
            .await?;
        Ok(update.value)
    }

    /// Sets a player's limit, opening a ledger for players new to credit.
    pub async fn set_credit_limit(
        &self,
        player_id: PlayerId,
        new_limit: Decimal,
    ) -> Result<PlayerLedger> {
        money::check_minor_units(new_limit)?;
        let _guard = self.lock(player_id).await?;
        let mut ledger = self
            .store
            .get(player_id)
            .await?
            .unwrap_or_else(|| PlayerLedger::new(player_id));
        ledger.set_credit_limit(new_limit)?;
        self.store.store(ledger.clone()).await?;
        info!(
            "credit limit for player {} set to {} (outstanding {})",
            player_id, ledger.credit_limit, ledger.outstanding_credit
        );
        Ok(ledger)
    }

    /// Reads without locking; a status is a point-in-time snapshot.
    pub async fn status(&self, player_id: PlayerId) -> Result<CreditStatus> {
        Ok(self.require(player_id).await?.status())
    }

    pub async fn all(&self) -> Result<Vec<PlayerLedger>> {
        self.store.get_all().await
    }
}
