//! Transfer validation and atomic commit against the stores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    transfer::new_reference, AccountKind, Direction, Money, Transaction, TransactionStatus,
    TransferDestination, TransferRequest, TransferResult,
};
use crate::errors::{CoreError, Result};
use crate::store::{AccountStore, TransactionLedger};

/// Category tag stamped on both legs of a transfer.
pub const TRANSFER_CATEGORY: &str = "transfer";

/// Policy limits applied as the final validation step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransferPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_transaction_limit: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_limit: Option<Money>,
    /// Whether a credit account may be the debited side of a transfer.
    #[serde(default)]
    pub allow_credit_source: bool,
}

impl Default for TransferPolicy {
    fn default() -> Self {
        Self {
            per_transaction_limit: Some(Money::from_cents(2_500_000)),
            daily_limit: Some(Money::from_cents(5_000_000)),
            allow_credit_source: false,
        }
    }
}

impl TransferPolicy {
    /// No limits, credit sources allowed. Useful for embedded callers that
    /// enforce limits elsewhere.
    pub fn unrestricted() -> Self {
        Self {
            per_transaction_limit: None,
            daily_limit: None,
            allow_credit_source: true,
        }
    }
}

/// Validates and commits transfers. Each attempt either commits fully (both
/// deltas plus legs) or leaves the stores untouched.
pub struct TransferProcessor;

impl TransferProcessor {
    /// Runs the ordered validation chain and, on success, commits the
    /// transfer. The first failed check wins; later checks are skipped.
    pub fn submit(
        accounts: &mut AccountStore,
        ledger: &mut TransactionLedger,
        policy: &TransferPolicy,
        request: &TransferRequest,
    ) -> Result<TransferResult> {
        let amount = match Self::validate(accounts, ledger, policy, request, Utc::now()) {
            Ok(amount) => amount,
            Err(err) => {
                tracing::warn!(from = %request.from_account, error = %err, "transfer rejected");
                return Err(err);
            }
        };
        Self::commit(accounts, ledger, request, amount)
    }

    fn validate(
        accounts: &AccountStore,
        ledger: &TransactionLedger,
        policy: &TransferPolicy,
        request: &TransferRequest,
        now: DateTime<Utc>,
    ) -> Result<Money> {
        let source = accounts
            .find(request.from_account)
            .filter(|account| account.is_active())
            .ok_or(CoreError::InvalidSourceAccount)?;
        if !policy.allow_credit_source && source.kind == AccountKind::Credit {
            return Err(CoreError::InvalidSourceAccount);
        }

        match &request.destination {
            TransferDestination::Internal { to_account } => {
                if *to_account == request.from_account || !accounts.contains(*to_account) {
                    return Err(CoreError::InvalidDestinationAccount);
                }
            }
            TransferDestination::External {
                recipient_name,
                account_number,
                bank_name,
            } => {
                if recipient_name.trim().is_empty() {
                    return Err(CoreError::MissingRecipientDetails("recipient name"));
                }
                if account_number.trim().is_empty() {
                    return Err(CoreError::MissingRecipientDetails("account number"));
                }
                if bank_name.trim().is_empty() {
                    return Err(CoreError::MissingRecipientDetails("bank name"));
                }
            }
        }

        let amount = Money::parse(&request.amount)
            .ok()
            .filter(|amount| amount.is_positive())
            .ok_or_else(|| CoreError::InvalidAmount(request.amount.clone()))?;

        if amount > source.available_balance() {
            return Err(CoreError::InsufficientFunds);
        }

        if let Some(limit) = policy.per_transaction_limit {
            if amount > limit {
                return Err(CoreError::LimitExceeded(format!(
                    "amount {amount} exceeds per-transaction limit {limit}"
                )));
            }
        }
        if let Some(limit) = policy.daily_limit {
            let spent = Self::debited_today(ledger, request.from_account, now);
            if spent + amount > limit {
                return Err(CoreError::LimitExceeded(format!(
                    "amount {amount} exceeds remaining daily limit {}",
                    limit - spent
                )));
            }
        }

        Ok(amount)
    }

    /// Transfer volume already debited from `account_id` today (UTC).
    /// Failed legs do not consume limit.
    fn debited_today(ledger: &TransactionLedger, account_id: Uuid, now: DateTime<Utc>) -> Money {
        let today = now.date_naive();
        ledger
            .list_all()
            .iter()
            .filter(|txn| {
                txn.account_id == account_id
                    && txn.direction == Direction::Debit
                    && txn.category == TRANSFER_CATEGORY
                    && txn.status != TransactionStatus::Failed
                    && txn.timestamp.date_naive() == today
            })
            .map(|txn| txn.amount)
            .sum()
    }

    fn commit(
        accounts: &mut AccountStore,
        ledger: &mut TransactionLedger,
        request: &TransferRequest,
        amount: Money,
    ) -> Result<TransferResult> {
        let reference = new_reference();
        let from = request.from_account;
        let source_name = accounts.get(from)?.name.clone();

        accounts.apply_delta(from, -amount)?;

        let legs = match &request.destination {
            TransferDestination::Internal { to_account } => {
                let to = *to_account;
                if let Err(err) = accounts.apply_delta(to, amount) {
                    Self::roll_back(accounts, from, amount);
                    return Err(err);
                }
                let destination_name = accounts.get(to)?.name.clone();
                let debit_description = request
                    .description
                    .clone()
                    .unwrap_or_else(|| format!("Transfer to {destination_name}"));
                let credit_description = request
                    .description
                    .clone()
                    .unwrap_or_else(|| format!("Transfer from {source_name}"));
                let debit = Transaction::new(
                    from,
                    Direction::Debit,
                    TRANSFER_CATEGORY,
                    debit_description,
                    amount,
                    reference.clone(),
                )
                .with_status(TransactionStatus::Completed);
                let credit = Transaction::new(
                    to,
                    Direction::Credit,
                    TRANSFER_CATEGORY,
                    credit_description,
                    amount,
                    reference.clone(),
                )
                .with_status(TransactionStatus::Completed);
                vec![debit, credit]
            }
            TransferDestination::External {
                recipient_name,
                account_number,
                bank_name,
            } => {
                let description = request
                    .description
                    .clone()
                    .unwrap_or_else(|| format!("Transfer to {recipient_name} ({bank_name})"));
                // Settlement happens off-system; the leg stays pending until
                // `settle_external_transfer` is called, and it carries the
                // counterparty account descriptor for the settlement side.
                let debit = Transaction::new(
                    from,
                    Direction::Debit,
                    TRANSFER_CATEGORY,
                    description,
                    amount,
                    reference.clone(),
                )
                .with_recipient(recipient_name.clone())
                .with_recipient_account(account_number.clone());
                vec![debit]
            }
        };

        let committed = legs;
        if let Err(err) = ledger.append_all(committed.clone(), accounts) {
            // Compensate every delta applied above; the stores must not
            // expose a half-applied transfer.
            Self::roll_back(accounts, from, amount);
            if let TransferDestination::Internal { to_account } = &request.destination {
                Self::roll_back(accounts, *to_account, -amount);
            }
            return Err(err);
        }

        tracing::info!(
            %reference,
            %amount,
            from = %from,
            legs = committed.len(),
            "transfer committed"
        );
        Ok(TransferResult {
            reference,
            transactions: committed,
        })
    }

    fn roll_back(accounts: &mut AccountStore, account_id: Uuid, amount: Money) {
        if let Err(err) = accounts.apply_delta(account_id, amount) {
            tracing::error!(account = %account_id, error = %err, "compensating delta failed");
        } else {
            tracing::warn!(account = %account_id, %amount, "compensating delta applied");
        }
    }
}
