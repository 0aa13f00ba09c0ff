//! Contract module - the materialized view folded from one trace
//!
//! A contract is derived state, rebuilt from spans, never the source
//! of truth. It is the only mutable record shape in the system.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::span::SpanId;

/// Lifecycle status of a contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    /// Drafted but not yet in force
    Draft,
    /// In force
    Active,
    /// All obligations fulfilled
    Completed,
    /// Cancelled before completion
    Cancelled,
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContractStatus::Draft => "draft",
            ContractStatus::Active => "active",
            ContractStatus::Completed => "completed",
            ContractStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// A party to a contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    /// Display name
    pub name: String,

    /// Role in the agreement (e.g. `debtor`, `creditor`)
    pub role: String,
}

/// The materialized summary view of one trace
///
/// `id` is the trace id. The view is recomputed by replaying all
/// spans of the trace; `created_at` is fixed from the creation span
/// and never changes, `updated_at` is the projection time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    /// Trace id this view summarizes
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// Optional longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Parties to the agreement
    pub parties: Vec<Party>,

    /// Current lifecycle status
    pub status: ContractStatus,

    /// RFC 3339 timestamp from the creation span, set once
    pub created_at: String,

    /// RFC 3339 timestamp of the last projection
    pub updated_at: String,

    /// RFC 3339 timestamp of completion or cancellation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,

    /// Ids of all spans in the trace, in trace order
    pub spans: Vec<SpanId>,
}
