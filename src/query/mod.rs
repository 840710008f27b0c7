//! Pure read-side filtering and aggregation over ledger snapshots.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Direction, Money, Transaction, TransactionStatus};

/// Conjunction of optional predicates; an omitted field imposes no
/// constraint. Predicates commute, so application order never matters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionFilter {
    /// Case-insensitive substring match on description or category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
}

impl TransactionFilter {
    /// Matches everything.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_account(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let hit = txn.description.to_lowercase().contains(&needle)
                || txn.category.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        if let Some(direction) = self.direction {
            if txn.direction != direction {
                return false;
            }
        }
        if let Some(status) = self.status {
            if txn.status != status {
                return false;
            }
        }
        if let Some(account_id) = self.account_id {
            if txn.account_id != account_id {
                return false;
            }
        }
        true
    }
}

/// Applies `filter` to a ledger snapshot, preserving input order.
pub fn filter<'a>(
    transactions: &'a [Transaction],
    filter: &TransactionFilter,
) -> Vec<&'a Transaction> {
    transactions.iter().filter(|txn| filter.matches(txn)).collect()
}

/// Aggregated totals over a (typically filtered) transaction set.
///
/// Credit/debit totals cover only `Completed` transactions, while `count`
/// covers the whole set regardless of status. That asymmetry is deliberate
/// and load-bearing for callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub total_credit: Money,
    pub total_debit: Money,
    pub count: usize,
}

/// Computes [`LedgerSummary`] for the provided transactions.
pub fn summarize<'a, I>(transactions: I) -> LedgerSummary
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut summary = LedgerSummary::default();
    for txn in transactions {
        summary.count += 1;
        if txn.status != TransactionStatus::Completed {
            continue;
        }
        match txn.direction {
            Direction::Credit => summary.total_credit += txn.amount,
            Direction::Debit => summary.total_debit += txn.amount,
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(
        account_id: Uuid,
        direction: Direction,
        status: TransactionStatus,
        description: &str,
        cents: i64,
    ) -> Transaction {
        Transaction::new(
            account_id,
            direction,
            "payment",
            description,
            Money::from_cents(cents),
            "REF",
        )
        .with_status(status)
    }

    fn snapshot() -> (Vec<Transaction>, Uuid, Uuid) {
        let checking = Uuid::new_v4();
        let savings = Uuid::new_v4();
        let rows = vec![
            txn(checking, Direction::Credit, TransactionStatus::Completed, "Salary Deposit", 520_000),
            txn(checking, Direction::Debit, TransactionStatus::Completed, "Electric Company", 14_250),
            txn(checking, Direction::Debit, TransactionStatus::Pending, "Transfer to Investment", 250_000),
            txn(savings, Direction::Credit, TransactionStatus::Completed, "Transfer from Checking", 100_000),
            txn(checking, Direction::Debit, TransactionStatus::Failed, "Internet Service", 7_999),
        ];
        (rows, checking, savings)
    }

    #[test]
    fn empty_filter_matches_everything() {
        let (rows, _, _) = snapshot();
        assert_eq!(filter(&rows, &TransactionFilter::all()).len(), rows.len());
    }

    #[test]
    fn predicates_conjoin() {
        let (rows, checking, _) = snapshot();
        let conjunction = TransactionFilter::all()
            .with_account(checking)
            .with_direction(Direction::Debit)
            .with_status(TransactionStatus::Completed);
        let hits = filter(&rows, &conjunction);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].description, "Electric Company");
    }

    #[test]
    fn search_is_case_insensitive_over_description_and_category() {
        let (rows, _, _) = snapshot();
        let by_description = filter(&rows, &TransactionFilter::all().with_search("SALARY"));
        assert_eq!(by_description.len(), 1);
        let by_category = filter(&rows, &TransactionFilter::all().with_search("payMent"));
        assert_eq!(by_category.len(), rows.len());
    }

    #[test]
    fn filter_fields_commute() {
        let (rows, checking, _) = snapshot();
        let joint = filter(
            &rows,
            &TransactionFilter::all()
                .with_direction(Direction::Debit)
                .with_account(checking),
        );
        let staged: Vec<&Transaction> = rows
            .iter()
            .filter(|txn| TransactionFilter::all().with_account(checking).matches(txn))
            .filter(|txn| {
                TransactionFilter::all()
                    .with_direction(Direction::Debit)
                    .matches(txn)
            })
            .collect();
        let ids = |rows: &[&Transaction]| rows.iter().map(|txn| txn.id).collect::<Vec<_>>();
        assert_eq!(ids(&joint), ids(&staged));
    }

    #[test]
    fn totals_only_count_completed_but_count_counts_all() {
        let (rows, _, _) = snapshot();
        let summary = summarize(rows.iter());
        assert_eq!(summary.count, 5);
        assert_eq!(summary.total_credit, Money::from_cents(620_000));
        assert_eq!(summary.total_debit, Money::from_cents(14_250));
    }
}
