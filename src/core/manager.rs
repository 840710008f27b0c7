//! Facade that coordinates bank state, persistence, and backups.

use std::path::PathBuf;

use crate::core::bank::{Bank, CURRENT_SCHEMA_VERSION};
use crate::errors::{CoreError, Result};
use crate::storage::{BackupInfo, StorageBackend};

/// Holds the currently loaded bank and routes persistence through an
/// injected storage backend. The core never reaches into ambient global
/// state; everything flows through this facade.
pub struct BankManager {
    pub current: Option<Bank>,
    current_name: Option<String>,
    storage: Box<dyn StorageBackend>,
}

impl BankManager {
    pub fn new(storage: Box<dyn StorageBackend>) -> Self {
        Self {
            current: None,
            current_name: None,
            storage,
        }
    }

    pub fn storage(&self) -> &dyn StorageBackend {
        self.storage.as_ref()
    }

    pub fn load(&mut self, name: &str) -> Result<()> {
        let bank = self.storage.load(name)?;
        self.ensure_schema_support(bank.schema_version)?;
        self.current = Some(bank);
        self.current_name = Some(name.to_string());
        Ok(())
    }

    pub fn save(&mut self) -> Result<PathBuf> {
        let name = self
            .current_name
            .clone()
            .ok_or_else(|| CoreError::Storage("current bank is unnamed".into()))?;
        self.save_as(&name)
    }

    pub fn save_as(&mut self, name: &str) -> Result<PathBuf> {
        let bank = self
            .current
            .as_ref()
            .ok_or_else(|| CoreError::Storage("no bank loaded".into()))?;
        let path = self.storage.save(bank, name)?;
        self.current_name = Some(name.to_string());
        Ok(path)
    }

    pub fn backup(&self, note: Option<&str>) -> Result<PathBuf> {
        let name = self
            .current_name
            .as_deref()
            .ok_or_else(|| CoreError::Storage("current bank is unnamed".into()))?;
        self.storage.backup(name, note)
    }

    pub fn list_backups(&self, name: &str) -> Result<Vec<BackupInfo>> {
        self.storage.list_backups(name)
    }

    pub fn restore_backup(&mut self, name: &str, backup_name: &str) -> Result<()> {
        let bank = self.storage.restore(name, backup_name)?;
        self.ensure_schema_support(bank.schema_version)?;
        self.current = Some(bank);
        self.current_name = Some(name.to_string());
        Ok(())
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current_name.as_deref()
    }

    pub fn set_current(&mut self, bank: Bank, name: Option<String>) {
        self.current = Some(bank);
        self.current_name = name;
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.current_name = None;
    }

    fn ensure_schema_support(&self, schema_version: u8) -> Result<()> {
        if schema_version > CURRENT_SCHEMA_VERSION {
            return Err(CoreError::Storage(format!(
                "bank schema v{} is newer than supported v{}",
                schema_version, CURRENT_SCHEMA_VERSION
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::JsonStorage;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_named_roundtrip() {
        let temp = tempdir().unwrap();
        let store = JsonStorage::new(Some(temp.path().to_path_buf()), Some(3)).unwrap();
        let mut manager = BankManager::new(Box::new(store));

        manager.set_current(Bank::seed_demo(), None);
        let path = manager.save_as("demo-bank").expect("save bank");
        assert!(path.exists());

        manager.clear();
        manager.load("demo-bank").expect("load bank");
        let bank = manager.current.as_ref().expect("bank loaded");
        assert_eq!(bank.list_accounts().len(), 4);
        assert_eq!(manager.current_name(), Some("demo-bank"));
    }

    #[test]
    fn rejects_future_schema_versions() {
        let temp = tempdir().unwrap();
        let store = JsonStorage::new(Some(temp.path().to_path_buf()), Some(3)).unwrap();
        let path = store.bank_path("future");
        let mut bank = Bank::new("Future");
        bank.schema_version = CURRENT_SCHEMA_VERSION + 5;
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, serde_json::to_string(&bank).unwrap()).unwrap();

        let mut manager = BankManager::new(Box::new(store));
        let err = manager
            .load("future")
            .expect_err("load future schema should fail");
        match err {
            CoreError::Storage(message) => {
                assert!(message.contains("newer"), "unexpected error: {message}");
            }
            other => panic!("expected storage error, got {other:?}"),
        }
    }
}
