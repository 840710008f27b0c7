//! The persisted aggregate and the facade exposed to presentation callers.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Account, AccountKind, Direction, Money, Transaction, TransactionStatus, TransferRequest,
    TransferResult,
};
use crate::errors::{CoreError, Result};
use crate::query::{self, LedgerSummary, TransactionFilter};
use crate::store::{AccountStore, TransactionLedger};
use crate::transfer::{TransferPolicy, TransferProcessor};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Owns the account store and transaction ledger for one banking profile.
///
/// All mutation funnels through the methods here; callers never touch the
/// stores directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bank {
    pub id: Uuid,
    pub name: String,
    pub accounts: AccountStore,
    pub ledger: TransactionLedger,
    #[serde(default)]
    pub policy: TransferPolicy,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Bank::schema_version_default")]
    pub schema_version: u8,
}

impl Bank {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            accounts: AccountStore::new(),
            ledger: TransactionLedger::new(),
            policy: TransferPolicy::default(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn with_policy(mut self, policy: TransferPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Registers an account (onboarding is external to the transfer core).
    pub fn add_account(&mut self, account: Account) -> Uuid {
        let id = self.accounts.add(account);
        self.touch();
        id
    }

    pub fn list_accounts(&self) -> &[Account] {
        self.accounts.list()
    }

    pub fn account(&self, id: Uuid) -> Result<&Account> {
        self.accounts.get(id)
    }

    /// Transactions matching `filter`, in ledger order.
    pub fn transactions(&self, filter: &TransactionFilter) -> Vec<&Transaction> {
        query::filter(self.ledger.list_all(), filter)
    }

    /// A single account's history, newest first.
    pub fn account_history(&self, account_id: Uuid) -> Vec<&Transaction> {
        self.ledger.list_by_account(account_id)
    }

    /// Aggregated totals over the transactions matching `filter`.
    pub fn summarize(&self, filter: &TransactionFilter) -> LedgerSummary {
        query::summarize(self.transactions(filter).into_iter())
    }

    /// Validates and commits a transfer; see [`TransferProcessor`].
    pub fn submit_transfer(&mut self, request: &TransferRequest) -> Result<TransferResult> {
        let result =
            TransferProcessor::submit(&mut self.accounts, &mut self.ledger, &self.policy, request)?;
        self.touch();
        Ok(result)
    }

    /// Marks a pending external leg as settled.
    pub fn settle_external_transfer(&mut self, transaction_id: Uuid) -> Result<()> {
        self.ledger
            .mark_status(transaction_id, TransactionStatus::Completed)?;
        self.touch();
        Ok(())
    }

    /// Marks a pending external leg as failed and refunds the debited amount.
    ///
    /// The leg stays in the ledger as the audit record; only the balance is
    /// compensated.
    pub fn fail_external_transfer(&mut self, transaction_id: Uuid) -> Result<()> {
        let txn = self.ledger.get(transaction_id)?;
        if txn.status.is_terminal() {
            return Err(CoreError::InvalidTransition {
                from: txn.status,
                to: TransactionStatus::Failed,
            });
        }
        let (account_id, amount) = (txn.account_id, txn.amount);
        self.accounts.apply_delta(account_id, amount)?;
        self.ledger
            .mark_status(transaction_id, TransactionStatus::Failed)?;
        self.touch();
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }

    /// Builds a ready-to-use demo profile: four accounts and ten sample
    /// transactions across the supported categories and statuses.
    pub fn seed_demo() -> Self {
        let mut bank = Bank::new("Demo");
        let checking = bank.add_account(
            Account::new("Primary Checking", AccountKind::Checking)
                .with_number("****4521")
                .with_balance(Money::from_cents(2_485_075)),
        );
        let savings = bank.add_account(
            Account::new("High-Yield Savings", AccountKind::Savings)
                .with_number("****8932")
                .with_balance(Money::from_cents(5_234_020))
                .with_interest_rate(4.5),
        );
        bank.add_account(
            Account::new("Investment Portfolio", AccountKind::Investment)
                .with_number("****2156")
                .with_balance(Money::from_cents(12_875_000)),
        );
        let credit = bank.add_account(
            Account::new("Premium Credit Card", AccountKind::Credit)
                .with_number("****7789")
                .with_balance(Money::from_cents(-215_030))
                .with_credit_limit(Money::from_cents(1_500_000)),
        );

        let seed = |account: Uuid,
                    direction: Direction,
                    category: &str,
                    description: &str,
                    cents: i64,
                    at: (u32, u32, u32),
                    status: TransactionStatus,
                    reference: &str| {
            let (day, hour, minute) = at;
            Transaction::new(
                account,
                direction,
                category,
                description,
                Money::from_cents(cents),
                reference,
            )
            .with_status(status)
            .with_timestamp(Utc.with_ymd_and_hms(2024, 1, day, hour, minute, 0).unwrap())
        };

        let rows = vec![
            seed(checking, Direction::Debit, "transfer", "Transfer to Sarah Johnson", 50_000, (28, 14, 32), TransactionStatus::Completed, "TRF-2024-001")
                .with_recipient("Sarah Johnson"),
            seed(checking, Direction::Credit, "deposit", "Salary Deposit", 520_000, (26, 9, 0), TransactionStatus::Completed, "DEP-2024-001"),
            seed(checking, Direction::Debit, "payment", "Electric Company", 14_250, (25, 16, 45), TransactionStatus::Completed, "PAY-2024-003"),
            seed(checking, Direction::Debit, "subscription", "Netflix Subscription", 1_599, (24, 0, 0), TransactionStatus::Completed, "SUB-2024-004"),
            seed(savings, Direction::Credit, "transfer", "Transfer from Checking", 100_000, (23, 11, 20), TransactionStatus::Completed, "TRF-2024-005"),
            seed(checking, Direction::Debit, "withdrawal", "ATM Withdrawal", 20_000, (22, 18, 30), TransactionStatus::Completed, "WDL-2024-006"),
            seed(checking, Direction::Credit, "refund", "Amazon Refund", 4_599, (21, 10, 15), TransactionStatus::Completed, "RFD-2024-007"),
            seed(credit, Direction::Debit, "payment", "Whole Foods Market", 8_732, (20, 13, 45), TransactionStatus::Completed, "PAY-2024-008"),
            seed(checking, Direction::Debit, "transfer", "Transfer to Investment", 250_000, (19, 9, 0), TransactionStatus::Pending, "TRF-2024-009"),
            seed(checking, Direction::Debit, "payment", "Internet Service", 7_999, (18, 0, 0), TransactionStatus::Failed, "PAY-2024-010"),
        ];
        for row in rows {
            // Seed accounts always exist; append cannot miss.
            let _ = bank.ledger.append(row, &bank.accounts);
        }
        bank
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_seed_is_fully_populated() {
        let bank = Bank::seed_demo();
        assert_eq!(bank.list_accounts().len(), 4);
        assert_eq!(bank.ledger.len(), 10);

        let checking = bank
            .list_accounts()
            .iter()
            .find(|account| account.kind == AccountKind::Checking)
            .expect("checking account seeded");
        assert_eq!(checking.balance, Money::from_cents(2_485_075));
        assert_eq!(bank.account_history(checking.id).len(), 8);
    }

    #[test]
    fn settle_completes_a_pending_external_leg() {
        let mut bank = Bank::new("Settle");
        let checking = bank.add_account(
            Account::new("Checking", AccountKind::Checking)
                .with_balance(Money::from_cents(100_000)),
        );
        let result = bank
            .submit_transfer(&TransferRequest::external(
                checking,
                "Sarah Johnson",
                "998877",
                "First National",
                "500",
            ))
            .expect("external transfer");
        let leg_id = result.transactions[0].id;

        bank.settle_external_transfer(leg_id).expect("settles once");
        let err = bank
            .settle_external_transfer(leg_id)
            .expect_err("second settle is invalid");
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
    }

    #[test]
    fn failed_external_transfer_refunds_the_debit() {
        let mut bank = Bank::new("Refund");
        let checking = bank.add_account(
            Account::new("Checking", AccountKind::Checking)
                .with_balance(Money::from_cents(100_000)),
        );
        let result = bank
            .submit_transfer(&TransferRequest::external(
                checking,
                "Sarah Johnson",
                "998877",
                "First National",
                "250",
            ))
            .expect("external transfer");
        assert_eq!(bank.account(checking).unwrap().balance, Money::from_cents(75_000));

        bank.fail_external_transfer(result.transactions[0].id)
            .expect("failure refunds");
        assert_eq!(bank.account(checking).unwrap().balance, Money::from_cents(100_000));
        let leg = bank.ledger.get(result.transactions[0].id).unwrap();
        assert_eq!(leg.status, TransactionStatus::Failed);
    }
}
