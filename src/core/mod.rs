pub mod bank;
pub mod manager;

pub use bank::{Bank, CURRENT_SCHEMA_VERSION};
pub use manager::BankManager;
