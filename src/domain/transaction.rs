//! Domain model for ledger transactions.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Identifiable, Money};

/// One recorded money movement against a single account.
///
/// Immutable after creation except for `status`, which may leave `Pending`
/// exactly once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub direction: Direction,
    /// Free-form classification tag (transfer, deposit, payment, ...).
    pub category: String,
    pub description: String,
    /// Always positive; the sign is carried by `direction`.
    pub amount: Money,
    pub currency: String,
    pub timestamp: DateTime<Utc>,
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    /// Counterparty account descriptor for external transfer legs; the
    /// settlement collaborator reads the destination from here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_account: Option<String>,
    /// Correlates the one or two legs produced by a single transfer.
    pub reference: String,
}

impl Transaction {
    pub fn new(
        account_id: Uuid,
        direction: Direction,
        category: impl Into<String>,
        description: impl Into<String>,
        amount: Money,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            direction,
            category: category.into(),
            description: description.into(),
            amount,
            currency: "USD".into(),
            timestamp: Utc::now(),
            status: TransactionStatus::Pending,
            recipient: None,
            recipient_account: None,
            reference: reference.into(),
        }
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    pub fn with_recipient_account(mut self, account: impl Into<String>) -> Self {
        self.recipient_account = Some(account.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Signed effect of this transaction on its account's balance.
    pub fn signed_amount(&self) -> Money {
        match self.direction {
            Direction::Credit => self.amount,
            Direction::Debit => -self.amount,
        }
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Direction of a transaction relative to its owning account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Credit,
    Debit,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Direction::Credit => "credit",
            Direction::Debit => "debit",
        };
        f.write_str(label)
    }
}

/// Enumerates the lifecycle state of a transaction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    /// Terminal statuses freeze the transaction; no further transition is
    /// allowed out of them.
    pub fn is_terminal(self) -> bool {
        matches!(self, TransactionStatus::Completed | TransactionStatus::Failed)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_amount_follows_direction() {
        let account = Uuid::new_v4();
        let debit = Transaction::new(
            account,
            Direction::Debit,
            "payment",
            "Electric Company",
            Money::from_cents(14_250),
            "PAY-1",
        );
        let credit = Transaction::new(
            account,
            Direction::Credit,
            "deposit",
            "Salary Deposit",
            Money::from_cents(520_000),
            "DEP-1",
        );
        assert_eq!(debit.signed_amount(), Money::from_cents(-14_250));
        assert_eq!(credit.signed_amount(), Money::from_cents(520_000));
    }

    #[test]
    fn terminal_statuses_are_completed_and_failed() {
        assert!(!TransactionStatus::Pending.is_terminal());
        assert!(TransactionStatus::Completed.is_terminal());
        assert!(TransactionStatus::Failed.is_terminal());
    }
}
