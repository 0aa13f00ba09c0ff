//! Whole-ledger integrity verification
//!
//! Re-validates every contract trace: content hashes, signatures, and
//! parent references. All findings across all spans are collected into
//! one report; a single corrupted span never masks problems elsewhere.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Display;

use pacta_crypto::{span_hash, verify_bytes};
use pacta_domain::{SignerResolver, Span, SpanStore};
use thiserror::Error;

use crate::error::LedgerError;

const CREATED_TYPE: &str = "contract.created";

/// One integrity finding. These are report entries, not raised errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    /// The recomputed content hash differs from the stored one
    #[error("hash mismatch on span {span_id}: expected {expected}, got {actual}")]
    HashMismatch {
        /// Id of the affected span
        span_id: String,
        /// Hash stored in the span
        expected: String,
        /// Hash recomputed from the span's fields
        actual: String,
    },

    /// The signature does not verify, or the signer is unknown
    #[error("invalid signature on span {span_id}")]
    InvalidSignature {
        /// Id of the affected span
        span_id: String,
    },

    /// `parent_id` does not resolve to a span in the same trace
    #[error("span {span_id} references missing parent {parent_id}")]
    DanglingParent {
        /// Id of the affected span
        span_id: String,
        /// The unresolved parent reference
        parent_id: String,
    },
}

/// The result of a full verification pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerReport {
    /// True when no findings were collected
    pub valid: bool,
    /// Number of spans examined
    pub total: usize,
    /// Every finding across every examined span
    pub errors: Vec<IntegrityError>,
}

/// Verify the whole ledger.
///
/// Examines every trace that contains a `contract.created` span. For
/// each span in such a trace: recompute the content hash, verify the
/// signature (when present) against the resolver's public key for its
/// signer, and require `parent_id` to resolve within the same trace.
/// Never fail-fast: the pass always completes and returns every
/// finding.
pub fn verify_ledger<S, R>(store: &S, resolver: &R) -> Result<LedgerReport, LedgerError>
where
    S: SpanStore,
    S::Error: Display,
    R: SignerResolver,
{
    let all = store
        .all_spans()
        .map_err(|e| LedgerError::Store(e.to_string()))?;

    let mut traces: BTreeMap<&str, Vec<&Span>> = BTreeMap::new();
    for span in &all {
        traces.entry(span.trace_id.as_str()).or_default().push(span);
    }

    let mut errors = Vec::new();
    let mut total = 0;

    for spans in traces.values() {
        if !spans.iter().any(|s| s.span_type == CREATED_TYPE) {
            // Partial trace, no contract yet: nothing to hold it to
            continue;
        }

        let trace_ids: HashSet<&str> = spans.iter().map(|s| s.id.as_str()).collect();

        for span in spans {
            total += 1;

            match span_hash(span) {
                Ok(actual) if actual == span.integrity.hash => {}
                Ok(actual) => errors.push(IntegrityError::HashMismatch {
                    span_id: span.id.to_string(),
                    expected: span.integrity.hash.clone(),
                    actual,
                }),
                Err(e) => return Err(e.into()),
            }

            if let Some(confirmation) = &span.confirmation {
                let verified = resolver
                    .resolve(&confirmation.signer_id)
                    .is_some_and(|public_key| {
                        verify_bytes(
                            span.integrity.hash.as_bytes(),
                            &confirmation.signature,
                            &public_key,
                        )
                    });
                if !verified {
                    errors.push(IntegrityError::InvalidSignature {
                        span_id: span.id.to_string(),
                    });
                }
            }

            if let Some(parent_id) = &span.parent_id {
                if !trace_ids.contains(parent_id.as_str()) {
                    errors.push(IntegrityError::DanglingParent {
                        span_id: span.id.to_string(),
                        parent_id: parent_id.to_string(),
                    });
                }
            }
        }
    }

    Ok(LedgerReport {
        valid: errors.is_empty(),
        total,
        errors,
    })
}
