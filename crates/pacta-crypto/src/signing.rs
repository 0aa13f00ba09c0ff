//! Ed25519 signing and verification
//!
//! The private key is held behind [`SignerHandle`], an opaque signing
//! capability: callers get `sign` and the encoded public key, never
//! the seed bytes. Persistence goes through key files directly
//! (base64 seed, 0o600 on Unix) so no in-memory export path exists.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use pacta_domain::{timestamp, Confirmation, Span};

use crate::error::CryptoError;
use crate::hash::span_hash;

/// Algorithm prefix written into every signature and public key string
pub const SIGNATURE_ALGO: &str = "ed25519";

/// An opaque Ed25519 signing capability bound to a keypair.
///
/// Exposes only signing and the public key; the seed never leaves
/// this type except through [`SignerHandle::generate_to_file`].
pub struct SignerHandle {
    key: SigningKey,
}

impl SignerHandle {
    /// Generate a fresh in-memory keypair
    pub fn generate() -> Self {
        let mut rng = rand::rngs::OsRng;
        Self {
            key: SigningKey::generate(&mut rng),
        }
    }

    /// Generate a keypair and persist the seed to `path` as base64.
    ///
    /// Sets 0o600 permissions on Unix. The seed is written once here
    /// and is not otherwise observable.
    pub fn generate_to_file(path: &Path) -> Result<Self, CryptoError> {
        let handle = Self::generate();
        let encoded = BASE64.encode(handle.key.to_bytes());
        std::fs::write(path, &encoded)
            .map_err(|e| CryptoError::KeyFile(format!("writing '{}': {}", path.display(), e)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(path, perms).map_err(|e| {
                CryptoError::KeyFile(format!("setting permissions on '{}': {}", path.display(), e))
            })?;
        }

        Ok(handle)
    }

    /// Load a keypair from a base64-encoded seed file
    pub fn load_from_file(path: &Path) -> Result<Self, CryptoError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CryptoError::KeyFile(format!("reading '{}': {}", path.display(), e)))?;
        let bytes = BASE64
            .decode(contents.trim())
            .map_err(|e| CryptoError::InvalidKey(format!("decoding '{}': {}", path.display(), e)))?;
        let seed: [u8; 32] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidKey(format!(
                "invalid seed length in '{}': expected 32 bytes",
                path.display()
            ))
        })?;
        Ok(Self {
            key: SigningKey::from_bytes(&seed),
        })
    }

    /// Sign bytes, returning a domain-prefixed signature (`"ed25519:<hex>"`)
    pub fn sign(&self, message: &[u8]) -> String {
        let signature = self.key.sign(message);
        format!("{}:{}", SIGNATURE_ALGO, hex::encode(signature.to_bytes()))
    }

    /// The encoded public key (`"ed25519:<hex>"`)
    pub fn public_key(&self) -> String {
        format!(
            "{}:{}",
            SIGNATURE_ALGO,
            hex::encode(self.key.verifying_key().to_bytes())
        )
    }
}

/// Populate a span's confirmation.
///
/// The digest covers the confirmation's `domain`, `timestamp`, and
/// `signer_id` (only the signature itself is excluded), so the
/// confirmation must be attached before hashing: attach it with a
/// blank signature, recompute `integrity.hash` over the result, then
/// sign the hash string and fill the signature in. Any hash computed
/// before this call is superseded.
pub fn sign_span(
    span: &mut Span,
    handle: &SignerHandle,
    signer_id: &str,
    domain: &str,
) -> Result<(), CryptoError> {
    span.confirmation = Some(Confirmation {
        signature: String::new(),
        domain: domain.to_string(),
        timestamp: timestamp::now(),
        signer_id: signer_id.to_string(),
    });
    span.integrity.hash = span_hash(span)?;

    let signature = handle.sign(span.integrity.hash.as_bytes());
    if let Some(confirmation) = span.confirmation.as_mut() {
        confirmation.signature = signature;
    }
    Ok(())
}

/// Verify a domain-prefixed signature over raw bytes.
///
/// Returns `false` on any mismatch or malformed input, never an
/// error: callers compose this into a report.
pub fn verify_bytes(message: &[u8], signature: &str, public_key: &str) -> bool {
    let Some(sig_bytes) = decode_prefixed(signature) else {
        return false;
    };
    let Some(key_bytes) = decode_prefixed(public_key) else {
        return false;
    };

    let sig_array: [u8; 64] = match sig_bytes.try_into() {
        Ok(a) => a,
        Err(_) => return false,
    };
    let key_array: [u8; 32] = match key_bytes.try_into() {
        Ok(a) => a,
        Err(_) => return false,
    };
    let Ok(key) = VerifyingKey::from_bytes(&key_array) else {
        return false;
    };

    key.verify(message, &Signature::from_bytes(&sig_array)).is_ok()
}

/// Verify a span end to end against a public key.
///
/// Recomputes the content hash, requires it to equal the stored
/// `integrity.hash`, then verifies the signature over that hash
/// string. `false` on any mismatch, unsigned span, or hash failure.
pub fn verify_span(span: &Span, public_key: &str) -> bool {
    let Ok(recomputed) = span_hash(span) else {
        return false;
    };
    if recomputed != span.integrity.hash {
        return false;
    }
    let Some(confirmation) = span.confirmation.as_ref() else {
        return false;
    };
    verify_bytes(
        span.integrity.hash.as_bytes(),
        &confirmation.signature,
        public_key,
    )
}

/// Strip the `"<algo>:"` prefix and hex-decode the remainder
fn decode_prefixed(value: &str) -> Option<Vec<u8>> {
    let hex_part = value.strip_prefix(SIGNATURE_ALGO)?.strip_prefix(':')?;
    hex::decode(hex_part).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacta_domain::{Span, SpanBody};
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_span() -> Span {
        Span::new(
            "t1",
            "contract.created",
            "minicontrato",
            SpanBody::new("create_contract", json!({"title": "Aluguel"})),
        )
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let handle = SignerHandle::generate();
        let message = b"blake3:abc123";
        let signature = handle.sign(message);

        assert!(signature.starts_with("ed25519:"));
        assert!(verify_bytes(message, &signature, &handle.public_key()));
    }

    #[test]
    fn test_verify_rejects_wrong_key() {
        let handle = SignerHandle::generate();
        let other = SignerHandle::generate();
        let signature = handle.sign(b"message");

        assert!(!verify_bytes(b"message", &signature, &other.public_key()));
    }

    #[test]
    fn test_verify_rejects_malformed_input() {
        let handle = SignerHandle::generate();
        let signature = handle.sign(b"message");

        // Garbage never panics, only fails
        assert!(!verify_bytes(b"message", "not-a-signature", &handle.public_key()));
        assert!(!verify_bytes(b"message", &signature, "ed25519:zzzz"));
        assert!(!verify_bytes(b"message", "ed25519:00", &handle.public_key()));
        assert!(!verify_bytes(b"message", &signature, ""));
    }

    #[test]
    fn test_sign_span_fills_hash_and_confirmation() {
        let handle = SignerHandle::generate();
        let mut span = sample_span();
        assert!(span.integrity.hash.is_empty());

        sign_span(&mut span, &handle, "user-1", "pacta.local").unwrap();

        assert!(span.integrity.hash.starts_with("blake3:"));
        let confirmation = span.confirmation.as_ref().unwrap();
        assert_eq!(confirmation.signer_id, "user-1");
        assert_eq!(confirmation.domain, "pacta.local");
        // The stored hash must be reproducible from the signed span
        assert_eq!(span_hash(&span).unwrap(), span.integrity.hash);
        assert!(verify_span(&span, &handle.public_key()));
    }

    #[test]
    fn test_sign_span_supersedes_prefilled_hash() {
        // A hash computed before signing cannot cover the confirmation
        // metadata; signing must replace it with one that does.
        let handle = SignerHandle::generate();
        let mut span = sample_span();
        span.integrity.hash = span_hash(&span).unwrap();
        let unsigned_hash = span.integrity.hash.clone();

        sign_span(&mut span, &handle, "user-1", "pacta.local").unwrap();

        assert_ne!(span.integrity.hash, unsigned_hash);
        assert_eq!(span_hash(&span).unwrap(), span.integrity.hash);
        assert!(verify_span(&span, &handle.public_key()));
    }

    #[test]
    fn test_tamper_after_signing_fails_verification() {
        let handle = SignerHandle::generate();
        let mut span = sample_span();
        sign_span(&mut span, &handle, "user-1", "pacta.local").unwrap();

        // Mutating any hashed field breaks verification
        let mut tampered = span.clone();
        tampered.body.input = json!({"title": "Outro"});
        assert!(!verify_span(&tampered, &handle.public_key()));

        let mut tampered = span.clone();
        tampered.trace_id = "t2".to_string();
        assert!(!verify_span(&tampered, &handle.public_key()));

        // Untouched span still verifies
        assert!(verify_span(&span, &handle.public_key()));
    }

    #[test]
    fn test_unsigned_span_does_not_verify() {
        let handle = SignerHandle::generate();
        let mut span = sample_span();
        span.integrity.hash = span_hash(&span).unwrap();
        assert!(!verify_span(&span, &handle.public_key()));
    }

    #[test]
    fn test_key_file_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("identity.secret");

        let handle = SignerHandle::generate_to_file(&path).unwrap();
        let loaded = SignerHandle::load_from_file(&path).unwrap();

        // Same key material: signatures are interchangeable
        assert_eq!(handle.public_key(), loaded.public_key());
        let signature = loaded.sign(b"roundtrip");
        assert!(verify_bytes(b"roundtrip", &signature, &handle.public_key()));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_load_invalid_key_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.secret");
        std::fs::write(&path, "not-valid-base64!!!").unwrap();
        assert!(SignerHandle::load_from_file(&path).is_err());

        std::fs::write(&path, BASE64.encode(b"short")).unwrap();
        assert!(SignerHandle::load_from_file(&path).is_err());
    }
}
