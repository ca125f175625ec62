use crate::domain::money::{Amount, Balance};
use crate::domain::{CallerId, PlayerId};
use crate::error::AuthError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Cashier,
    Player,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "admin",
            Role::Cashier => "cashier",
            Role::Player => "player",
        };
        f.write_str(name)
    }
}

/// Operations gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateRequest,
    Decide,
    Settle,
    SetCreditLimit,
    ReviewQueue,
    ViewPlayer(PlayerId),
}

impl Action {
    fn describe(&self) -> &'static str {
        match self {
            Action::CreateRequest => "create credit requests",
            Action::Decide => "decide credit requests",
            Action::Settle => "record settlements",
            Action::SetCreditLimit => "set credit limits",
            Action::ReviewQueue => "review the approval queue",
            Action::ViewPlayer(_) => "view player credit",
        }
    }
}

/// The authenticated party behind a core call, as supplied by the identity
/// provider.
///
/// `issue_allowance` is the cashier's remaining delegated issuing limit. It is
/// ignored for admins, who issue without a cashier ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub id: CallerId,
    pub role: Role,
    pub issue_allowance: Option<Amount>,
}

impl Caller {
    pub fn admin(id: CallerId) -> Self {
        Self {
            id,
            role: Role::Admin,
            issue_allowance: None,
        }
    }

    pub fn cashier(id: CallerId, issue_allowance: Option<Amount>) -> Self {
        Self {
            id,
            role: Role::Cashier,
            issue_allowance,
        }
    }

    pub fn player(id: PlayerId) -> Self {
        Self {
            id,
            role: Role::Player,
            issue_allowance: None,
        }
    }

    /// The amount this caller may still issue without admin sign-off.
    /// `None` means no cashier ceiling applies.
    pub fn cashier_remaining_limit(&self) -> Option<Balance> {
        match self.role {
            Role::Admin => None,
            _ => Some(self.issue_allowance.map(Balance::from).unwrap_or(Balance::ZERO)),
        }
    }

    pub fn authorize(&self, action: Action) -> Result<(), AuthError> {
        let allowed = match (self.role, action) {
            (Role::Admin, _) => true,
            (Role::Cashier, Action::CreateRequest | Action::Settle | Action::ViewPlayer(_)) => {
                true
            }
            (Role::Cashier, _) => false,
            (Role::Player, Action::ViewPlayer(player_id)) => {
                if player_id != self.id {
                    return Err(AuthError::ForeignPlayer {
                        caller_id: self.id,
                        player_id,
                    });
                }
                true
            }
            (Role::Player, _) => false,
        };

        if allowed {
            Ok(())
        } else {
            Err(AuthError::Forbidden {
                caller_id: self.id,
                role: self.role,
                action: action.describe(),
            })
        }
    }
}
