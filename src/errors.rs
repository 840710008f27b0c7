use thiserror::Error;
use uuid::Uuid;

use crate::domain::transaction::TransactionStatus;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Error type covering validation, lifecycle, and persistence failures.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("entity not found: {0}")]
    NotFound(Uuid),
    #[error("invalid source account")]
    InvalidSourceAccount,
    #[error("invalid destination account")]
    InvalidDestinationAccount,
    #[error("missing recipient details: {0}")]
    MissingRecipientDetails(&'static str),
    #[error("invalid amount: `{0}`")]
    InvalidAmount(String),
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("transfer limit exceeded: {0}")]
    LimitExceeded(String),
    #[error("account {0} is frozen or closed")]
    AccountFrozenOrClosed(Uuid),
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: TransactionStatus,
        to: TransactionStatus,
    },
    #[error("transaction references unknown account {0}")]
    UnknownAccount(Uuid),
    #[error("corrupt state: {0}")]
    CorruptState(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
