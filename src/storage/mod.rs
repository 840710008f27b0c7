pub mod json_backend;

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::core::bank::Bank;
use crate::errors::Result;

pub use json_backend::{check_integrity, JsonStorage};

/// Describes a persisted backup artifact for a bank snapshot.
#[derive(Debug, Clone)]
pub struct BackupInfo {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub path: PathBuf,
}

/// Abstraction over persistence backends capable of storing bank snapshots
/// and backups.
pub trait StorageBackend: Send + Sync {
    fn save(&self, bank: &Bank, name: &str) -> Result<PathBuf>;
    fn load(&self, name: &str) -> Result<Bank>;
    fn list(&self) -> Result<Vec<String>>;
    fn delete(&self, name: &str) -> Result<()>;
    fn backup(&self, name: &str, note: Option<&str>) -> Result<PathBuf>;
    fn list_backups(&self, name: &str) -> Result<Vec<BackupInfo>>;
    fn restore(&self, name: &str, backup_name: &str) -> Result<Bank>;
    fn bank_path(&self, name: &str) -> PathBuf;
}
