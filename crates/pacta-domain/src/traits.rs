//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and
//! infrastructure. Implementations live in other crates.

use crate::{Contract, Span};

/// Trait for the append-only span store
///
/// Implemented by the infrastructure layer (pacta-store). Spans are
/// never updated or deleted through this interface; append-only is
/// the core guarantee.
pub trait SpanStore {
    /// Error type for store operations
    type Error;

    /// Append a span. Fails if a span with the same id already exists;
    /// the store must be unchanged after a failed append.
    fn append(&mut self, span: &Span) -> Result<(), Self::Error>;

    /// Get a span by id
    fn get(&self, id: &str) -> Result<Option<Span>, Self::Error>;

    /// Query spans matching the filter, newest first
    fn query(&self, query: &SpanQuery) -> Result<Vec<Span>, Self::Error>;

    /// All spans of one trace, in trace order (ascending start time,
    /// insertion order as tiebreaker)
    fn trace_spans(&self, trace_id: &str) -> Result<Vec<Span>, Self::Error>;

    /// All spans in insertion order
    fn all_spans(&self) -> Result<Vec<Span>, Self::Error>;

    /// Get the materialized contract view for a trace
    fn contract(&self, trace_id: &str) -> Result<Option<Contract>, Self::Error>;

    /// Insert or replace a contract view
    fn upsert_contract(&mut self, contract: &Contract) -> Result<(), Self::Error>;
}

/// Query criteria for retrieving spans
///
/// Filters compose by progressive narrowing; every field is optional.
/// Timestamps are RFC 3339 strings compared against `started_at`.
#[derive(Debug, Clone, Default)]
pub struct SpanQuery {
    /// Filter by trace id
    pub trace_id: Option<String>,

    /// Filter by span type (dotted event name)
    pub span_type: Option<String>,

    /// Filter by entity category
    pub entity: Option<String>,

    /// Filter by confirmation signer id
    pub signer_id: Option<String>,

    /// Inclusive lower bound on `started_at`
    pub from: Option<String>,

    /// Inclusive upper bound on `started_at`
    pub to: Option<String>,

    /// Maximum results to return, applied after filtering and sorting
    pub limit: Option<usize>,
}

/// Resolves a signer id to an encoded public key (`"ed25519:<hex>"`)
///
/// The verifier takes a resolver rather than assuming the local
/// identity, so a ledger signed by several parties can be checked.
pub trait SignerResolver {
    /// Look up the public key for a signer id, if known
    fn resolve(&self, signer_id: &str) -> Option<String>;
}

/// A resolver backed by a fixed map of signer ids to public keys
#[derive(Debug, Clone, Default)]
pub struct StaticSignerResolver {
    keys: std::collections::HashMap<String, String>,
}

impl StaticSignerResolver {
    /// Create an empty resolver
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a signer's public key
    pub fn register(&mut self, signer_id: impl Into<String>, public_key: impl Into<String>) {
        self.keys.insert(signer_id.into(), public_key.into());
    }
}

impl SignerResolver for StaticSignerResolver {
    fn resolve(&self, signer_id: &str) -> Option<String> {
        self.keys.get(signer_id).cloned()
    }
}
