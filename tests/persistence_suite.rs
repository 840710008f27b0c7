//! Persistence behavior: roundtrips, backups, integrity, and atomic writes.

use std::fs;

use banking_core::core::{Bank, BankManager};
use banking_core::domain::{Money, TransferRequest};
use banking_core::errors::CoreError;
use banking_core::storage::{JsonStorage, StorageBackend};
use tempfile::tempdir;

fn storage_in(temp: &tempfile::TempDir) -> JsonStorage {
    JsonStorage::new(Some(temp.path().to_path_buf()), Some(3)).expect("storage root")
}

#[test]
fn manager_roundtrips_a_full_bank() {
    let temp = tempdir().unwrap();
    let mut manager = BankManager::new(Box::new(storage_in(&temp)));

    manager.set_current(Bank::seed_demo(), None);
    manager.save_as("demo").expect("save");

    let mut reloaded = BankManager::new(Box::new(storage_in(&temp)));
    reloaded.load("demo").expect("load");
    let bank = reloaded.current.as_ref().expect("bank present");
    assert_eq!(bank.list_accounts().len(), 4);
    assert_eq!(bank.ledger.len(), 10);
    assert_eq!(reloaded.current_name(), Some("demo"));
}

#[test]
fn load_refuses_a_ledger_with_dangling_account_references() {
    let temp = tempdir().unwrap();
    let storage = storage_in(&temp);
    storage.save(&Bank::seed_demo(), "corrupt").expect("save");

    let path = storage.bank_path("corrupt");
    let mut value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    value["ledger"]["transactions"][0]["account_id"] =
        serde_json::Value::String(uuid::Uuid::new_v4().to_string());
    fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();

    let err = storage.load("corrupt").expect_err("integrity check fires");
    assert!(matches!(err, CoreError::CorruptState(_)));
}

#[test]
fn restore_rolls_state_back_to_the_backup() {
    let temp = tempdir().unwrap();
    let mut manager = BankManager::new(Box::new(storage_in(&temp)));

    let bank = Bank::seed_demo();
    let (checking, savings) = {
        let accounts = bank.list_accounts();
        (accounts[0].id, accounts[1].id)
    };
    let before = bank.account(checking).unwrap().balance;
    manager.set_current(bank, None);
    manager.save_as("demo").expect("first save");
    manager.backup(Some("before transfer")).expect("backup");

    let current = manager.current.as_mut().unwrap();
    current
        .submit_transfer(&TransferRequest::internal(checking, savings, "100"))
        .expect("transfer");
    manager.save().expect("second save");
    assert_eq!(
        manager.current.as_ref().unwrap().account(checking).unwrap().balance,
        before - Money::from_cents(10_000)
    );

    let backups = manager.list_backups("demo").expect("backups listed");
    assert!(!backups.is_empty());
    manager
        .restore_backup("demo", &backups[0].name)
        .expect("restore");
    assert_eq!(
        manager.current.as_ref().unwrap().account(checking).unwrap().balance,
        before
    );
}

#[test]
fn failed_write_preserves_the_previous_snapshot() {
    let temp = tempdir().unwrap();
    let storage = storage_in(&temp);
    let bank = Bank::seed_demo();
    let path = storage.save(&bank, "atomic").expect("initial save");
    let original = fs::read_to_string(&path).unwrap();

    // Occupy the temp slot with a directory so the staged write cannot land.
    let mut blocked = path.clone();
    blocked.set_extension("json.tmp");
    fs::create_dir_all(&blocked).unwrap();

    let err = storage.save(&bank, "atomic");
    assert!(err.is_err(), "staged write must fail");
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn list_reports_saved_banks_by_canonical_name() {
    let temp = tempdir().unwrap();
    let storage = storage_in(&temp);
    storage.save(&Bank::new("Alpha"), "Alpha Bank").unwrap();
    storage.save(&Bank::new("Beta"), "beta").unwrap();

    assert_eq!(storage.list().unwrap(), vec!["alpha_bank", "beta"]);

    storage.delete("Alpha Bank").unwrap();
    assert_eq!(storage.list().unwrap(), vec!["beta"]);
}
