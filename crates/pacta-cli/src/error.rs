//! Error types for the CLI

use thiserror::Error;

/// Result alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors surfaced by the CLI
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] pacta_store::StoreError),

    /// Ledger error
    #[error("Ledger error: {0}")]
    Ledger(#[from] pacta_ledger::LedgerError),

    /// Crypto error
    #[error("Crypto error: {0}")]
    Crypto(#[from] pacta_crypto::CryptoError),

    /// Malformed user-supplied input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The integrity pass found problems (count of findings)
    #[error("Ledger integrity check failed with {0} finding(s)")]
    IntegrityFailed(usize),
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::InvalidInput(format!("JSON parse error: {}", e))
    }
}
