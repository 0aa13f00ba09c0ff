//! Error types for the crypto layer

use thiserror::Error;

/// Errors that can occur during hashing, signing, or encryption
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Canonical serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Key material could not be read or parsed
    #[error("Invalid key material: {0}")]
    InvalidKey(String),

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Wrong derivation input or tampered ciphertext. Carries no
    /// detail: the authenticated cipher cannot tell the causes apart.
    #[error("Decryption failure")]
    DecryptionFailure,

    /// Key file I/O error
    #[error("Key file error: {0}")]
    KeyFile(String),
}

impl From<serde_json::Error> for CryptoError {
    fn from(e: serde_json::Error) -> Self {
        CryptoError::Serialization(e.to_string())
    }
}
