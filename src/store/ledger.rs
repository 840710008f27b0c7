//! Append-only transaction ledger.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Transaction, TransactionStatus};
use crate::errors::{CoreError, Result};
use crate::store::AccountStore;

/// Append-only record of transactions.
///
/// Amount, account, and direction are immutable once appended; only `status`
/// may move, and only out of `Pending`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionLedger {
    transactions: Vec<Transaction>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a transaction after checking its account exists.
    pub fn append(&mut self, transaction: Transaction, accounts: &AccountStore) -> Result<Uuid> {
        if !accounts.contains(transaction.account_id) {
            return Err(CoreError::UnknownAccount(transaction.account_id));
        }
        let id = transaction.id;
        tracing::debug!(
            transaction = %id,
            account = %transaction.account_id,
            direction = %transaction.direction,
            amount = %transaction.amount,
            "transaction appended"
        );
        self.transactions.push(transaction);
        Ok(id)
    }

    /// Appends a batch of transactions, all or none.
    ///
    /// Every account reference is checked before the first push, so a bad
    /// record never leaves a partial batch behind.
    pub fn append_all(
        &mut self,
        transactions: Vec<Transaction>,
        accounts: &AccountStore,
    ) -> Result<Vec<Uuid>> {
        if let Some(txn) = transactions
            .iter()
            .find(|txn| !accounts.contains(txn.account_id))
        {
            return Err(CoreError::UnknownAccount(txn.account_id));
        }
        let mut ids = Vec::with_capacity(transactions.len());
        for txn in transactions {
            ids.push(self.append(txn, accounts)?);
        }
        Ok(ids)
    }

    pub fn get(&self, id: Uuid) -> Result<&Transaction> {
        self.transactions
            .iter()
            .find(|txn| txn.id == id)
            .ok_or(CoreError::NotFound(id))
    }

    /// Transitions a transaction out of `Pending` exactly once.
    ///
    /// Terminal transactions and transitions back to `Pending` fail with
    /// `InvalidTransition` and leave the record untouched.
    pub fn mark_status(
        &mut self,
        id: Uuid,
        status: TransactionStatus,
    ) -> Result<&Transaction> {
        let txn = self
            .transactions
            .iter_mut()
            .find(|txn| txn.id == id)
            .ok_or(CoreError::NotFound(id))?;
        if txn.status.is_terminal() || status == TransactionStatus::Pending {
            return Err(CoreError::InvalidTransition {
                from: txn.status,
                to: status,
            });
        }
        txn.status = status;
        tracing::info!(transaction = %id, status = %txn.status, "transaction status updated");
        Ok(txn)
    }

    pub fn list_all(&self) -> &[Transaction] {
        &self.transactions
    }

    /// All transactions owned by `account_id`, newest first.
    pub fn list_by_account(&self, account_id: Uuid) -> Vec<&Transaction> {
        let mut rows: Vec<&Transaction> = self
            .transactions
            .iter()
            .filter(|txn| txn.account_id == account_id)
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        rows
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
