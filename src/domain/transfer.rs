//! Transfer request and result types exchanged with callers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::transaction::Transaction;

/// Caller-supplied transfer instruction. Not persisted; the amount stays the
/// raw input string until validation parses it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from_account: Uuid,
    pub destination: TransferDestination,
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TransferRequest {
    /// Builds a transfer between two accounts held in the same store.
    pub fn internal(from_account: Uuid, to_account: Uuid, amount: impl Into<String>) -> Self {
        Self {
            from_account,
            destination: TransferDestination::Internal { to_account },
            amount: amount.into(),
            description: None,
        }
    }

    /// Builds a transfer whose counterparty ledger is outside this system.
    pub fn external(
        from_account: Uuid,
        recipient_name: impl Into<String>,
        account_number: impl Into<String>,
        bank_name: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            from_account,
            destination: TransferDestination::External {
                recipient_name: recipient_name.into(),
                account_number: account_number.into(),
                bank_name: bank_name.into(),
            },
            amount: amount.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Where a transfer sends its funds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferDestination {
    Internal {
        to_account: Uuid,
    },
    External {
        recipient_name: String,
        account_number: String,
        bank_name: String,
    },
}

/// Outcome of a committed transfer: the shared reference and the ledger legs
/// it produced.
#[derive(Debug, Clone)]
pub struct TransferResult {
    pub reference: String,
    pub transactions: Vec<Transaction>,
}

/// Generates a fresh correlation reference, e.g. `TRF-9F2C41AB`.
pub fn new_reference() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("TRF-{}", id[..8].to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_carry_the_transfer_prefix() {
        let reference = new_reference();
        assert!(reference.starts_with("TRF-"));
        assert_eq!(reference.len(), 12);
        assert!(reference[4..]
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }
}
