use crate::domain::identity::Role;
use crate::domain::request::RequestStatus;
use crate::domain::{CallerId, PlayerId, RequestId};
use miette::Diagnostic;
use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CreditError>;

/// Rejections raised while checking the shape of a submission.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("no chips selected for requested amount {requested}")]
    #[diagnostic(code(credit::validation::no_chips))]
    NoChipsSelected { requested: Decimal },

    #[error("chip breakdown totals {breakdown_total} but {requested} was requested")]
    #[diagnostic(code(credit::validation::mismatched_total))]
    MismatchedTotal {
        requested: Decimal,
        breakdown_total: Decimal,
    },

    #[error("amount {amount} must be positive")]
    #[diagnostic(code(credit::validation::non_positive_amount))]
    NonPositiveAmount { amount: Decimal },

    #[error("amount {amount} is finer than the currency minor unit")]
    #[diagnostic(code(credit::validation::too_precise))]
    TooPrecise { amount: Decimal },

    #[error("denomination {denomination} appears more than once in the breakdown")]
    #[diagnostic(code(credit::validation::duplicate_denomination))]
    DuplicateDenomination { denomination: Decimal },

    #[error("chip breakdown total overflows at {count} x {denomination}")]
    #[diagnostic(code(credit::validation::breakdown_overflow))]
    BreakdownOverflow { denomination: Decimal, count: u32 },

    #[error("malformed chip breakdown entry `{entry}`")]
    #[diagnostic(
        code(credit::validation::malformed_breakdown),
        help("entries look like `1000x3`, separated by spaces or `;`")
    )]
    MalformedBreakdown { entry: String },
}

#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum PolicyError {
    #[error("player {player_id} has no credit limit set")]
    #[diagnostic(code(credit::policy::no_credit_limit))]
    NoCreditLimitSet { player_id: PlayerId },

    #[error("player {player_id} has no credit ledger")]
    #[diagnostic(code(credit::policy::unknown_player))]
    UnknownPlayer { player_id: PlayerId },
}

#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("request {request_id} is {status}, not pending")]
    #[diagnostic(code(credit::workflow::not_pending))]
    NotPending {
        request_id: RequestId,
        status: RequestStatus,
    },

    #[error("a decision on request {request_id} requires notes")]
    #[diagnostic(code(credit::workflow::notes_required))]
    NotesRequired { request_id: RequestId },

    #[error("request {request_id} not found")]
    #[diagnostic(code(credit::workflow::request_not_found))]
    RequestNotFound { request_id: RequestId },
}

#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error(
        "issuing {amount} to player {player_id} would raise outstanding credit to {projected}, above the limit of {credit_limit}"
    )]
    #[diagnostic(code(credit::ledger::limit_exceeded))]
    LimitExceeded {
        player_id: PlayerId,
        amount: Decimal,
        projected: Decimal,
        credit_limit: Decimal,
    },

    #[error("settling {amount} exceeds player {player_id}'s outstanding credit of {outstanding}")]
    #[diagnostic(code(credit::ledger::over_settlement))]
    OverSettlement {
        player_id: PlayerId,
        amount: Decimal,
        outstanding: Decimal,
    },

    #[error(
        "issuing {amount} to player {player_id} overflows outstanding credit of {outstanding}"
    )]
    #[diagnostic(code(credit::ledger::balance_overflow))]
    BalanceOverflow {
        player_id: PlayerId,
        amount: Decimal,
        outstanding: Decimal,
    },

    #[error("credit limit {new_limit} for player {player_id} is negative")]
    #[diagnostic(code(credit::ledger::negative_limit))]
    NegativeLimit {
        player_id: PlayerId,
        new_limit: Decimal,
    },
}

#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum SettlementError {
    #[error("settlement amount {amount} for player {player_id} is invalid")]
    #[diagnostic(code(credit::settlement::invalid_amount))]
    InvalidAmount { player_id: PlayerId, amount: Decimal },

    #[error("online settlement via {mode} for player {player_id} requires payment evidence")]
    #[diagnostic(code(credit::settlement::evidence_required))]
    EvidenceRequired { player_id: PlayerId, mode: String },

    #[error("unknown payment mode `{mode}`")]
    #[diagnostic(
        code(credit::settlement::unknown_payment_mode),
        help("use `cash` or `online_<bank>`")
    )]
    UnknownPaymentMode { mode: String },
}

#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("caller {caller_id} with role {role} may not {action}")]
    #[diagnostic(code(credit::auth::forbidden))]
    Forbidden {
        caller_id: CallerId,
        role: Role,
        action: &'static str,
    },

    #[error("player {caller_id} may not view player {player_id}")]
    #[diagnostic(code(credit::auth::foreign_player))]
    ForeignPlayer {
        caller_id: CallerId,
        player_id: PlayerId,
    },
}

#[derive(Error, Diagnostic, Debug)]
pub enum CreditError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Settlement(#[from] SettlementError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Auth(#[from] AuthError),

    #[error("ledger for player {player_id} stayed locked after {attempts} attempts")]
    #[diagnostic(code(credit::contention), help("retry the operation"))]
    Contention { player_id: PlayerId, attempts: u32 },

    #[error("Invalid command at row {row}: {message}")]
    #[diagnostic(code(credit::invalid_command))]
    InvalidCommand { row: usize, message: String },

    #[error("Storage error: {0}")]
    #[diagnostic(code(credit::storage))]
    Storage(Box<dyn std::error::Error + Send + Sync>),

    #[error("CSV error: {0}")]
    #[diagnostic(code(credit::csv))]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    #[diagnostic(code(credit::io))]
    Io(#[from] std::io::Error),
}

impl CreditError {
    /// Infrastructure failures may succeed on retry; domain rejections will not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CreditError::Contention { .. } | CreditError::Storage(_) | CreditError::Io(_)
        )
    }

    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        CreditError::Storage(Box::new(err))
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for CreditError {
    fn from(err: rocksdb::Error) -> Self {
        CreditError::storage(err)
    }
}

impl From<serde_json::Error> for CreditError {
    fn from(err: serde_json::Error) -> Self {
        CreditError::storage(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_messages_carry_identifiers() {
        let err: CreditError = LedgerError::OverSettlement {
            player_id: 7,
            amount: dec!(2000),
            outstanding: dec!(1500),
        }
        .into();
        let msg = err.to_string();
        assert!(msg.contains("player 7"));
        assert!(msg.contains("2000"));
        assert!(msg.contains("1500"));
    }

    #[test]
    fn test_only_infrastructure_errors_are_retryable() {
        let contention = CreditError::Contention {
            player_id: 1,
            attempts: 3,
        };
        assert!(contention.is_retryable());

        let io = CreditError::Io(std::io::Error::other("disk gone"));
        assert!(io.is_retryable());

        let domain: CreditError = WorkflowError::NotesRequired { request_id: 1 }.into();
        assert!(!domain.is_retryable());
    }
}
