pub mod accounts;
pub mod ledger;

pub use accounts::AccountStore;
pub use ledger::TransactionLedger;
