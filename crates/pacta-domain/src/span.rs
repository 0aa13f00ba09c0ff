//! Span module - the fundamental unit of the Pacta ledger

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::timestamp;

/// Version string written into `integrity.version` on new spans.
pub const INTEGRITY_VERSION: &str = "1.0.0";

/// Unique identifier for a span.
///
/// Freshly minted identifiers are UUIDv7 strings, which are
/// time-sortable and need no coordination. Spans extracted from
/// external sources may carry arbitrary non-empty string ids, so the
/// wrapper accepts any string and only generation is UUID-based.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpanId(String);

impl SpanId {
    /// Generate a new UUIDv7-based SpanId
    ///
    /// # Examples
    ///
    /// ```
    /// use pacta_domain::SpanId;
    ///
    /// let id = SpanId::new();
    /// assert_eq!(id.as_str().len(), 36);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// Wrap an existing identifier string
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A short prefix of the identifier, for display fallbacks
    pub fn prefix(&self, len: usize) -> &str {
        let end = self.0.char_indices().nth(len).map_or(self.0.len(), |(i, _)| i);
        &self.0[..end]
    }
}

impl Default for SpanId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SpanId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A span - one atomic, immutable record in the ledger
///
/// Once appended, a span's field values never change; re-verification
/// must always reproduce the same content hash from the same fields.
/// Serialized field names are the persisted format and are preserved
/// exactly (`type` is renamed on the Rust side only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Globally unique, time-sortable identifier
    pub id: SpanId,

    /// Groups spans belonging to one logical workflow (e.g. one contract)
    pub trace_id: String,

    /// Optional reference to another span's id within the same trace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<SpanId>,

    /// Dotted event name, e.g. `contract.created`
    #[serde(rename = "type")]
    pub span_type: String,

    /// Coarse category (`minicontrato`, `user`, `payment`, ...)
    pub entity: String,

    /// Action payload
    pub body: SpanBody,

    /// RFC 3339 start timestamp
    pub started_at: String,

    /// RFC 3339 completion timestamp, when the action finished
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,

    /// Duration in milliseconds, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,

    /// Content-addressing envelope
    pub integrity: Integrity,

    /// Signer confirmation, present on signed spans
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<Confirmation>,
}

/// The action payload of a span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanBody {
    /// Action name, e.g. `create_contract`
    pub action: String,

    /// Action input, arbitrary JSON
    #[serde(default)]
    pub input: Value,

    /// Action output, arbitrary JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,

    /// Rules attached to the action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Rule>>,

    /// Free-form metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, Value>>,
}

/// A rule attached to a span body. The rule payload is free-form JSON
/// whose shape is owned by the producing workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rule(pub Value);

/// Content-addressing envelope of a span
///
/// `hash` is a domain-prefixed digest (`"blake3:<hex>"`) over the
/// canonical encoding of the span with `hash` blanked and
/// `confirmation.signature` removed. An empty `hash` means the span
/// has not yet passed through the append path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Integrity {
    /// Domain-prefixed content hash, empty until computed
    #[serde(default)]
    pub hash: String,

    /// Format version of the integrity scheme
    pub version: String,
}

/// Signer confirmation of a span
///
/// The signature is over the `integrity.hash` string, not the whole
/// span: the hash binds the content, the signature binds a signer to
/// that hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Confirmation {
    /// Domain-prefixed signature (`"ed25519:<hex>"`) over the hash string
    pub signature: String,

    /// Signing context the signature belongs to
    pub domain: String,

    /// RFC 3339 timestamp of the signature
    pub timestamp: String,

    /// Identifier of the signing party
    pub signer_id: String,
}

impl Span {
    /// Create a new unsigned span with a fresh id and start timestamp.
    ///
    /// `integrity.hash` is left empty; the ledger append path computes
    /// it before persisting.
    pub fn new(
        trace_id: impl Into<String>,
        span_type: impl Into<String>,
        entity: impl Into<String>,
        body: SpanBody,
    ) -> Self {
        Self {
            id: SpanId::new(),
            trace_id: trace_id.into(),
            parent_id: None,
            span_type: span_type.into(),
            entity: entity.into(),
            body,
            started_at: timestamp::now(),
            completed_at: None,
            duration_ms: None,
            integrity: Integrity {
                hash: String::new(),
                version: INTEGRITY_VERSION.to_string(),
            },
            confirmation: None,
        }
    }

    /// The signer id of this span's confirmation, if signed
    pub fn signer_id(&self) -> Option<&str> {
        self.confirmation.as_ref().map(|c| c.signer_id.as_str())
    }
}

impl SpanBody {
    /// Create a body with an action name and input payload
    pub fn new(action: impl Into<String>, input: Value) -> Self {
        Self {
            action: action.into(),
            input,
            output: None,
            rules: None,
            metadata: None,
        }
    }
}
