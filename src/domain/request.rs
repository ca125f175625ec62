use crate::domain::chips::ChipBreakdown;
use crate::domain::money::Amount;
use crate::domain::{CallerId, PlayerId, RequestId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalType {
    Instant,
    AdminApproved,
    AdminRequired,
}

/// An admin's verdict on a pending request.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

/// A single submission for a line of credit.
///
/// Created once, decided once, never deleted.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct CreditRequest {
    pub id: RequestId,
    pub player_id: PlayerId,
    pub requested_amount: Amount,
    pub chip_breakdown: ChipBreakdown,
    pub status: RequestStatus,
    pub approval_type: ApprovalType,
    pub requested_by: CallerId,
    pub approver_id: Option<CallerId>,
    pub notes: String,
    pub decision_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl CreditRequest {
    /// Builds a request as the policy classified it. Instant requests are
    /// born approved, with the submitting caller recorded as approver.
    #[allow(clippy::too_many_arguments)]
    pub fn submitted(
        id: RequestId,
        player_id: PlayerId,
        requested_amount: Amount,
        chip_breakdown: ChipBreakdown,
        approval_type: ApprovalType,
        requested_by: CallerId,
        notes: String,
        now: DateTime<Utc>,
    ) -> Self {
        let instant = approval_type == ApprovalType::Instant;
        Self {
            id,
            player_id,
            requested_amount,
            chip_breakdown,
            status: if instant {
                RequestStatus::Approved
            } else {
                RequestStatus::Pending
            },
            approval_type,
            requested_by,
            approver_id: instant.then_some(requested_by),
            notes,
            decision_notes: None,
            created_at: now,
            decided_at: instant.then_some(now),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// The request as it looks after an admin decision. Does not check the
    /// current status; the store's compare-and-set does that atomically.
    pub fn decided(
        &self,
        decision: Decision,
        approver_id: CallerId,
        notes: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let (status, approval_type) = match decision {
            Decision::Approve => (RequestStatus::Approved, ApprovalType::AdminApproved),
            Decision::Reject => (RequestStatus::Rejected, self.approval_type),
        };
        Self {
            status,
            approval_type,
            approver_id: Some(approver_id),
            decision_notes: Some(notes.trim().to_string()),
            decided_at: Some(now),
            ..self.clone()
        }
    }
}
