//! Account records and the single balance mutation path.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Account, AccountKind, Money};
use crate::errors::{CoreError, Result};

/// Holds account records and enforces balance invariants on every mutation.
///
/// There is no balance setter; `apply_delta` is the only write path, so the
/// credit-limit and sufficient-funds checks cannot be bypassed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountStore {
    accounts: Vec<Account>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an account and returns its identifier.
    pub fn add(&mut self, account: Account) -> Uuid {
        let id = account.id;
        self.accounts.push(account);
        id
    }

    pub fn get(&self, id: Uuid) -> Result<&Account> {
        self.find(id).ok_or(CoreError::NotFound(id))
    }

    pub fn find(&self, id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.find(id).is_some()
    }

    pub fn list(&self) -> &[Account] {
        &self.accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Atomically adjusts a balance by `delta`.
    ///
    /// Rejects mutations on non-active accounts, debits that would push a
    /// credit account below `-credit_limit`, and debits that would push any
    /// other account below zero. This repeats the validator's pre-check on
    /// purpose: the store is the single source of truth, so callers racing
    /// past the validator still cannot break the invariant.
    pub fn apply_delta(&mut self, id: Uuid, delta: Money) -> Result<&Account> {
        let account = self
            .accounts
            .iter_mut()
            .find(|account| account.id == id)
            .ok_or(CoreError::NotFound(id))?;
        if !account.is_active() {
            return Err(CoreError::AccountFrozenOrClosed(id));
        }
        let next = account.balance + delta;
        let debit = delta < Money::ZERO;
        if (debit || account.kind == AccountKind::Credit) && next < account.balance_floor() {
            return Err(CoreError::InsufficientFunds);
        }
        account.balance = next;
        tracing::debug!(account = %id, %delta, balance = %account.balance, "balance adjusted");
        Ok(account)
    }
}
