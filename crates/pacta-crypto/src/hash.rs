//! Content addressing for spans
//!
//! A span's hash is computed over its canonical encoding with the
//! stored hash blanked and the signature removed, so the digest is
//! reproducible both before and after signing.

use pacta_domain::Span;
use serde_json::Value;

use crate::canonical::canonical_bytes;
use crate::error::CryptoError;

/// Algorithm prefix written into every hash string
pub const HASH_ALGO: &str = "blake3";

/// Hash raw bytes into a domain-prefixed digest (`"blake3:<hex>"`)
pub fn hash_bytes(data: &[u8]) -> String {
    format!("{}:{}", HASH_ALGO, blake3::hash(data).to_hex())
}

/// Compute the content hash of a span.
///
/// Pure and deterministic: the span is cloned, `integrity.hash` is
/// blanked, `confirmation.signature` is dropped entirely, and the
/// remainder is canonically serialized and hashed. No clock, no
/// randomness.
pub fn span_hash(span: &Span) -> Result<String, CryptoError> {
    let mut tree: Value = serde_json::to_value(span)?;

    if let Some(integrity) = tree.get_mut("integrity").and_then(Value::as_object_mut) {
        integrity.insert("hash".to_string(), Value::String(String::new()));
    }
    if let Some(confirmation) = tree.get_mut("confirmation").and_then(Value::as_object_mut) {
        confirmation.remove("signature");
    }

    let bytes = canonical_bytes(&tree)?;
    Ok(hash_bytes(&bytes))
}
