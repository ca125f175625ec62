//! Auto-approval policy for new credit requests.
//!
//! Player-risk checks run before cashier-authority checks: a request that
//! breaches the player's own ceiling always goes to an admin, whatever the
//! cashier is allowed to issue.

use crate::domain::ledger::PlayerLedger;
use crate::domain::money::{Amount, Balance};
use crate::domain::request::ApprovalType;
use crate::error::PolicyError;

pub fn decide(
    player: &PlayerLedger,
    cashier_remaining_limit: Option<Balance>,
    requested: Amount,
) -> Result<ApprovalType, PolicyError> {
    if player.credit_limit.is_zero() {
        return Err(PolicyError::NoCreditLimitSet {
            player_id: player.player_id,
        });
    }

    match player.outstanding_credit.checked_add(requested) {
        Some(projected) if projected <= player.credit_limit => {}
        _ => return Ok(ApprovalType::AdminRequired),
    }

    if let Some(remaining) = cashier_remaining_limit
        && Balance::from(requested) > remaining
    {
        return Ok(ApprovalType::AdminRequired);
    }

    Ok(ApprovalType::Instant)
}
