//! Pacta Domain Layer
//!
//! This crate contains the core data model for Pacta: the span (the
//! atomic, immutable unit of the ledger), the contract (a derived
//! summary view), and the trait seams that the infrastructure layers
//! implement.
//!
//! ## Key Concepts
//!
//! - **Span**: an atomic, immutable record of one action/event
//! - **Trace**: all spans sharing a `trace_id`, one logical workflow
//! - **Contract**: a mutable materialized view folded from one trace
//! - **Integrity**: a domain-prefixed content hash over the span's
//!   canonical encoding; the signed payload is the hash string itself
//!
//! ## Architecture
//!
//! Persisted field names are part of the wire format and must not
//! change; Rust-side naming differences are bridged with serde
//! renames. Infrastructure implementations (SQLite store, crypto,
//! extraction) live in other crates behind the traits defined here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod contract;
pub mod credential;
pub mod span;
pub mod timestamp;
pub mod traits;

// Re-exports for convenience
pub use contract::{Contract, ContractStatus, Party};
pub use credential::Credential;
pub use span::{Confirmation, Integrity, Rule, Span, SpanBody, SpanId};
pub use traits::{SignerResolver, SpanQuery, SpanStore, StaticSignerResolver};
