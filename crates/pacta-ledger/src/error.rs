//! Error types for the ledger layer

use pacta_crypto::CryptoError;
use thiserror::Error;

/// Errors that can occur on the ledger's write and verify paths.
///
/// Integrity findings (hash mismatch, bad signature, dangling parent)
/// are not errors in this sense: they are collected into a
/// [`crate::LedgerReport`] and never raised individually.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Span store error (conflict, database failure)
    #[error("Store error: {0}")]
    Store(String),

    /// Hashing or signing failure
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}
