//! Filesystem-backed JSON persistence for bank snapshots and backups.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::core::bank::Bank;
use crate::errors::{CoreError, Result};
use crate::storage::{BackupInfo, StorageBackend};
use crate::utils::paths;

const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// JSON persistence rooted at the app data directory (or an explicit root).
#[derive(Clone)]
pub struct JsonStorage {
    banks_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let base = root.unwrap_or_else(paths::app_data_dir);
        let banks_dir = paths::banks_dir_in(&base);
        let backups_dir = paths::backups_dir_in(&base);
        paths::ensure_dir(&banks_dir)?;
        paths::ensure_dir(&backups_dir)?;
        Ok(Self {
            banks_dir,
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    fn backup_existing_file(&self, name: &str, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        let dir = self.backup_dir(name);
        paths::ensure_dir(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let file_name = format!(
            "{}_{}.{}",
            canonical_name(name),
            timestamp,
            BACKUP_EXTENSION
        );
        fs::copy(path, dir.join(file_name))?;
        self.prune_backups(name)?;
        Ok(())
    }

    fn prune_backups(&self, name: &str) -> Result<()> {
        let mut entries = self.list_backups(name)?;
        entries.sort_by_key(|info| Reverse(info.created_at));
        for entry in entries.into_iter().skip(self.retention) {
            let _ = fs::remove_file(entry.path);
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn save(&self, bank: &Bank, name: &str) -> Result<PathBuf> {
        let path = self.bank_path(name);
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }
        self.backup_existing_file(name, &path)?;
        let json = serde_json::to_string_pretty(bank)?;
        let tmp = tmp_path(&path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &path)?;
        tracing::debug!(bank = %name, path = %path.display(), "bank saved");
        Ok(path)
    }

    fn load(&self, name: &str) -> Result<Bank> {
        load_bank_from_path(&self.bank_path(name))
    }

    fn list(&self) -> Result<Vec<String>> {
        if !self.banks_dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.banks_dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete(&self, name: &str) -> Result<()> {
        let path = self.bank_path(name);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn backup(&self, name: &str, note: Option<&str>) -> Result<PathBuf> {
        let source = self.bank_path(name);
        if !source.exists() {
            return Err(CoreError::Storage(format!("bank `{}` not found", name)));
        }
        let dir = self.backup_dir(name);
        paths::ensure_dir(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut stem = format!("{}_{}", canonical_name(name), timestamp);
        if let Some(label) = sanitize_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let path = dir.join(format!("{}.{}", stem, BACKUP_EXTENSION));
        fs::copy(&source, &path)?;
        self.prune_backups(name)?;
        Ok(path)
    }

    fn list_backups(&self, name: &str) -> Result<Vec<BackupInfo>> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(BackupInfo {
                    name: file_name.to_string(),
                    created_at: parse_backup_timestamp(file_name),
                    path: path.clone(),
                });
            }
        }
        entries.sort_by_key(|info| Reverse(info.created_at));
        Ok(entries)
    }

    fn restore(&self, name: &str, backup_name: &str) -> Result<Bank> {
        let backup_path = self.backup_dir(name).join(backup_name);
        if !backup_path.exists() {
            return Err(CoreError::Storage(format!(
                "backup `{}` not found",
                backup_name
            )));
        }
        let target = self.bank_path(name);
        if let Some(parent) = target.parent() {
            paths::ensure_dir(parent)?;
        }
        fs::copy(&backup_path, &target)?;
        load_bank_from_path(&target)
    }

    fn bank_path(&self, name: &str) -> PathBuf {
        self.banks_dir
            .join(format!("{}.{}", canonical_name(name), BACKUP_EXTENSION))
    }
}

/// Loads a bank snapshot, refusing to return one with dangling references.
pub fn load_bank_from_path(path: &Path) -> Result<Bank> {
    let data = fs::read_to_string(path)?;
    let bank: Bank = serde_json::from_str(&data)?;
    check_integrity(&bank)?;
    Ok(bank)
}

/// Verifies referential integrity: every transaction must reference an
/// account present in the snapshot. A violation is fatal, never dropped.
pub fn check_integrity(bank: &Bank) -> Result<()> {
    for txn in bank.ledger.list_all() {
        if !bank.accounts.contains(txn.account_id) {
            return Err(CoreError::CorruptState(format!(
                "transaction {} references missing account {}",
                txn.id, txn.account_id
            )));
        }
    }
    Ok(())
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "bank".into()
    } else {
        sanitized
    }
}

fn sanitize_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.')) && !sanitized.is_empty() && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let trimmed = name.strip_suffix(&format!(".{}", BACKUP_EXTENSION))?;
    let segments: Vec<&str> = trimmed.split('_').collect();
    if segments.len() < 2 {
        return None;
    }
    // Note labels may follow the timestamp; scan for the date/time pair.
    for window in segments.windows(2) {
        let (date, time) = (window[0], window[1]);
        if !is_digits(date, 8) || !is_digits(time, 4) {
            continue;
        }
        let raw = format!("{}{}", date, time);
        return NaiveDateTime::parse_from_str(&raw, "%Y%m%d%H%M")
            .ok()
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc));
    }
    None
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        paths::ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
