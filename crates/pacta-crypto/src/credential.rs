//! Credential encryption for the bring-your-own-key provider flow
//!
//! The plaintext API key is encrypted under a key derived from the
//! user id with PBKDF2-HMAC-SHA256 and AES-256-GCM. The blob layout
//! is base64(salt ‖ nonce ‖ ciphertext), one fresh salt and nonce per
//! call.
//!
//! A guessable user id makes the derivation input a weak secret; the
//! derivation cost (100k iterations) is the only brake. Callers that
//! can supply a stronger secret should.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

use crate::error::CryptoError;

const PBKDF2_ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;

/// Encrypt a plaintext credential for a user.
///
/// Returns base64(salt ‖ nonce ‖ ciphertext). Two calls with the same
/// inputs produce different blobs (fresh salt and nonce), but both
/// decrypt with the same `user_id`.
pub fn encrypt_credential(plaintext: &str, user_id: &str) -> Result<String, CryptoError> {
    let mut rng = rand::rngs::OsRng;

    let mut salt = [0u8; SALT_LEN];
    rng.fill_bytes(&mut salt);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill_bytes(&mut nonce_bytes);

    let key = derive_key(user_id, &salt);
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|e| CryptoError::Encryption(format!("cipher init: {}", e)))?;
    let ciphertext = cipher
        .encrypt(&Nonce::from(nonce_bytes), plaintext.as_bytes())
        .map_err(|e| CryptoError::Encryption(format!("sealing failed: {}", e)))?;

    let mut blob = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(BASE64.encode(blob))
}

/// Decrypt a credential blob with the same `user_id` it was encrypted
/// under.
///
/// Any failure - bad base64, truncated blob, wrong user id, tampered
/// ciphertext - is a single [`CryptoError::DecryptionFailure`]; there
/// is no partial recovery.
pub fn decrypt_credential(blob: &str, user_id: &str) -> Result<String, CryptoError> {
    let bytes = BASE64
        .decode(blob)
        .map_err(|_| CryptoError::DecryptionFailure)?;
    if bytes.len() < SALT_LEN + NONCE_LEN {
        return Err(CryptoError::DecryptionFailure);
    }

    let (salt, rest) = bytes.split_at(SALT_LEN);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

    let key = derive_key(user_id, salt);
    let cipher =
        Aes256Gcm::new_from_slice(&key).map_err(|_| CryptoError::DecryptionFailure)?;
    let nonce_array: [u8; NONCE_LEN] = nonce_bytes
        .try_into()
        .map_err(|_| CryptoError::DecryptionFailure)?;
    let plaintext = cipher
        .decrypt(&Nonce::from(nonce_array), ciphertext)
        .map_err(|_| CryptoError::DecryptionFailure)?;

    String::from_utf8(plaintext).map_err(|_| CryptoError::DecryptionFailure)
}

fn derive_key(user_id: &str, salt: &[u8]) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2_hmac::<Sha256>(user_id.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    key
}
