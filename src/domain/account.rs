use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Identifiable, Money};

/// Represents a financial account tracked by the account store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    /// Masked display number, e.g. `****4521`.
    pub number: String,
    pub kind: AccountKind,
    pub balance: Money,
    pub currency: String,
    pub status: AccountStatus,
    /// Credit accounts only: how far below zero the balance may go.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<Money>,
    /// Savings accounts only; informational, never used by the validator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<f64>,
}

impl Account {
    /// Creates an active account with a zero balance in USD.
    pub fn new(name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            number: String::new(),
            kind,
            balance: Money::ZERO,
            currency: "USD".into(),
            status: AccountStatus::Active,
            credit_limit: None,
            interest_rate: None,
        }
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = number.into();
        self
    }

    pub fn with_balance(mut self, balance: Money) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_credit_limit(mut self, limit: Money) -> Self {
        self.credit_limit = Some(limit);
        self
    }

    pub fn with_interest_rate(mut self, rate: f64) -> Self {
        self.interest_rate = Some(rate);
        self
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, AccountStatus::Active)
    }

    /// Balance usable for debits: raw balance, plus the credit limit for
    /// credit accounts.
    pub fn available_balance(&self) -> Money {
        match self.kind {
            AccountKind::Credit => self.balance + self.credit_limit.unwrap_or(Money::ZERO),
            _ => self.balance,
        }
    }

    /// Lowest balance this account may reach through validated debits.
    pub fn balance_floor(&self) -> Money {
        match self.kind {
            AccountKind::Credit => -self.credit_limit.unwrap_or(Money::ZERO),
            _ => Money::ZERO,
        }
    }
}

impl Identifiable for Account {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Enumerates the supported account classifications.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Checking,
    Savings,
    Investment,
    Credit,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccountKind::Checking => "checking",
            AccountKind::Savings => "savings",
            AccountKind::Investment => "investment",
            AccountKind::Credit => "credit",
        };
        f.write_str(label)
    }
}

/// Administrative state of an account; only `Active` accepts new debits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Frozen,
    Closed,
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccountStatus::Active => "active",
            AccountStatus::Frozen => "frozen",
            AccountStatus::Closed => "closed",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn available_balance_includes_credit_limit() {
        let credit = Account::new("Premium Credit Card", AccountKind::Credit)
            .with_balance(Money::from_cents(-215_030))
            .with_credit_limit(Money::from_cents(1_500_000));
        assert_eq!(credit.available_balance(), Money::from_cents(1_284_970));
        assert_eq!(credit.balance_floor(), Money::from_cents(-1_500_000));

        let checking = Account::new("Primary Checking", AccountKind::Checking)
            .with_balance(Money::from_cents(2_485_075));
        assert_eq!(checking.available_balance(), Money::from_cents(2_485_075));
        assert_eq!(checking.balance_floor(), Money::ZERO);
    }
}
