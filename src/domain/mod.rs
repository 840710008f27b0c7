pub mod account;
pub mod common;
pub mod transaction;
pub mod transfer;

pub use account::{Account, AccountKind, AccountStatus};
pub use common::{Identifiable, Money, ParseMoneyError};
pub use transaction::{Direction, Transaction, TransactionStatus};
pub use transfer::{TransferDestination, TransferRequest, TransferResult};
