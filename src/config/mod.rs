use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::domain::Money;
use crate::errors::Result;
use crate::transfer::TransferPolicy;
use crate::utils::paths;

const TMP_SUFFIX: &str = "tmp";

/// Runtime configuration: display currency, transfer limits, and the bank
/// opened last. Limits are stored in minor units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_transaction_limit_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_limit_cents: Option<i64>,
    #[serde(default)]
    pub allow_credit_source: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_opened_bank: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
            per_transaction_limit_cents: Some(2_500_000),
            daily_limit_cents: Some(5_000_000),
            allow_credit_source: false,
            last_opened_bank: None,
        }
    }
}

impl Config {
    /// Converts the configured limits into a transfer policy.
    pub fn transfer_policy(&self) -> TransferPolicy {
        TransferPolicy {
            per_transaction_limit: self.per_transaction_limit_cents.map(Money::from_cents),
            daily_limit: self.daily_limit_cents.map(Money::from_cents),
            allow_credit_source: self.allow_credit_source,
        }
    }
}

/// Loads and saves the active configuration file.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::from_base(paths::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        Self::from_base(base)
    }

    fn from_base(base: PathBuf) -> Result<Self> {
        paths::ensure_dir(&base)?;
        Ok(Self {
            path: paths::config_file_in(&base),
        })
    }

    /// Returns the stored configuration, or defaults when none exists yet.
    pub fn load(&self) -> Result<Config> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
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
