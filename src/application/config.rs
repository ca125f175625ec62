use std::time::Duration;

/// Tunables for the credit engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// How many times a ledger lock is tried before giving up with `Contention`.
    pub lock_attempts: u32,
    /// Delay after the first failed attempt; doubles on every retry.
    pub lock_backoff: Duration,
    /// Ceiling for a single backoff delay.
    pub lock_backoff_max: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lock_attempts: 32,
            lock_backoff: Duration::from_millis(1),
            lock_backoff_max: Duration::from_millis(50),
        }
    }
}

impl EngineConfig {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.lock_backoff
            .saturating_mul(factor)
            .min(self.lock_backoff_max)
    }
}
