//! Canonical JSON encoding for content addressing
//!
//! Two independent implementations that disagree on field order will
//! disagree on every hash and silently fail cross-verification, so
//! canonicalization must be deterministic. `serde_json::Map` is
//! backed by `BTreeMap` (the default when the `preserve_order`
//! feature is not enabled anywhere in the workspace), so routing a
//! value through `serde_json::Value` yields lexicographically sorted
//! object keys regardless of struct declaration order.

use serde::Serialize;
use serde_json::Value;

use crate::error::CryptoError;

/// Canonically encode any serializable value: compact JSON with
/// sorted object keys and no absent optional fields.
pub fn canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, CryptoError> {
    let tree: Value = serde_json::to_value(value)?;
    Ok(serde_json::to_string(&tree)?.into_bytes())
}
