use crate::application::config::EngineConfig;
use crate::domain::PlayerId;
use crate::error::{CreditError, Result};
use log::warn;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per player, created on first use.
///
/// Holding the guard returned by [`PlayerLocks::acquire`] is what makes a
/// ledger read-modify-write atomic with respect to every other mutation of the
/// same player. Different players never contend.
#[derive(Default)]
pub struct PlayerLocks {
    locks: StdMutex<HashMap<PlayerId, Arc<Mutex<()>>>>,
}

pub type PlayerGuard = OwnedMutexGuard<()>;

impl PlayerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, player_id: PlayerId) -> Arc<Mutex<()>> {
        // Only ever held for a map lookup, so a poisoned map is still consistent.
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(player_id).or_default().clone()
    }

    /// Takes the player's lock, retrying with exponential backoff. Gives up
    /// with [`CreditError::Contention`] after `config.lock_attempts` tries.
    pub async fn acquire(
        &self,
        player_id: PlayerId,
        config: &EngineConfig,
    ) -> Result<PlayerGuard> {
        let slot = self.slot(player_id);
        let attempts = config.lock_attempts.max(1);
        for attempt in 1..=attempts {
            if let Ok(guard) = slot.clone().try_lock_owned() {
                return Ok(guard);
            }
            if attempt < attempts {
                tokio::time::sleep(config.backoff_for(attempt)).await;
            }
        }
        warn!(
            "ledger for player {} still locked after {} attempts",
            player_id, attempts
        );
        Err(CreditError::Contention {
            player_id,
            attempts,
        })
    }
}
