//! Pacta Crypto Layer
//!
//! Content addressing, signing, and credential encryption for the
//! span ledger.
//!
//! # Scheme
//!
//! Two layers bind a span to a signer:
//!
//! 1. `integrity.hash` is a BLAKE3 digest over the span's canonical
//!    JSON encoding (sorted keys, `hash` blanked, `signature`
//!    removed), written as `"blake3:<hex>"`.
//! 2. `confirmation.signature` is an Ed25519 signature over the hash
//!    *string*, written as `"ed25519:<hex>"`.
//!
//! The private key lives behind [`SignerHandle`], which exposes only
//! a signing operation and the public key - raw key material never
//! crosses the API.
//!
//! Credential encryption derives an AES-256-GCM key from the user id
//! via PBKDF2-HMAC-SHA256 (100k iterations, random salt per call) and
//! frames the result as base64(salt ‖ nonce ‖ ciphertext).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod canonical;
pub mod credential;
pub mod error;
pub mod hash;
pub mod signing;

pub use credential::{decrypt_credential, encrypt_credential};
pub use error::CryptoError;
pub use hash::{hash_bytes, span_hash, HASH_ALGO};
pub use signing::{sign_span, verify_bytes, verify_span, SignerHandle, SIGNATURE_ALGO};
