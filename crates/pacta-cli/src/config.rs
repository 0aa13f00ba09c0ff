//! Configuration management for the CLI.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};

/// CLI configuration, stored at `~/.pacta/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite ledger database
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,

    /// Path to the local identity's secret key file
    #[serde(default = "default_key_path")]
    pub key_path: PathBuf,

    /// Local signer id, set by `pacta keygen`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Signing context recorded on confirmations
    #[serde(default = "default_domain")]
    pub domain: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ledger_path: default_ledger_path(),
            key_path: default_key_path(),
            user_id: None,
            domain: default_domain(),
        }
    }
}

impl Config {
    /// Get the configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(pacta_dir()?.join("config.toml"))
    }

    /// Load configuration from file or create default.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| CliError::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(&path, contents)?;
        Ok(())
    }

    /// The configured signer id, required for signing operations.
    pub fn require_user_id(&self) -> Result<&str> {
        self.user_id
            .as_deref()
            .ok_or_else(|| CliError::Config("No identity configured; run 'pacta keygen' first".into()))
    }
}

fn pacta_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
    Ok(home.join(".pacta"))
}

fn default_ledger_path() -> PathBuf {
    pacta_dir().map(|d| d.join("ledger.db")).unwrap_or_else(|_| PathBuf::from("ledger.db"))
}

fn default_key_path() -> PathBuf {
    pacta_dir()
        .map(|d| d.join("identity.secret"))
        .unwrap_or_else(|_| PathBuf::from("identity.secret"))
}

fn default_domain() -> String {
    "pacta.local".to_string()
}
