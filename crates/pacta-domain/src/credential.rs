//! Credential record for the bring-your-own-key model provider
//!
//! The plaintext API key is never persisted; `encrypted_key` is the
//! base64 blob produced by the crypto layer (salt ‖ nonce ‖
//! ciphertext).

use serde::{Deserialize, Serialize};

/// A stored, encrypted model-provider credential
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// Owner of the credential; also the key-derivation input
    pub user_id: String,

    /// base64(salt ‖ nonce ‖ ciphertext)
    pub encrypted_key: String,

    /// Provider name (e.g. `openai`)
    pub provider: String,

    /// Preferred model, when pinned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// RFC 3339 creation timestamp
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_roundtrip() {
        let cred = Credential {
            user_id: "user-1".to_string(),
            encrypted_key: "c2FsdG5vbmNlY2lwaGVydGV4dA==".to_string(),
            provider: "openai".to_string(),
            model: None,
            created_at: "2025-01-01T00:00:00Z".to_string(),
        };
        let text = serde_json::to_string(&cred).unwrap();
        assert!(!text.contains("model"));
        let back: Credential = serde_json::from_str(&text).unwrap();
        assert_eq!(cred, back);
    }
}
