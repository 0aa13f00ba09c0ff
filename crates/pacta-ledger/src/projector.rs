//! Contract view projection
//!
//! Folds all spans of one trace into a contract summary. Full replay
//! on every relevant append: O(spans in trace), acceptable at the
//! small per-trace span counts this ledger sees.

use std::fmt::Display;

use pacta_domain::{timestamp, Contract, ContractStatus, Party, Span, SpanStore};
use serde_json::Value;

use crate::error::LedgerError;

const CREATED_TYPE: &str = "contract.created";
const COMPLETED_TYPE: &str = "contract.completed";
const CANCELLED_TYPE: &str = "contract.cancelled";

/// Length of the span-id prefix used as a last-resort title
const TITLE_ID_PREFIX: usize = 8;

/// Project the contract view of one trace.
///
/// Returns `Ok(None)` when the trace has no `contract.created` span -
/// a partially written trace is not a contract yet. Recomputing from
/// an unchanged span set yields an identical contract except for
/// `updated_at`.
pub fn project<S>(store: &S, trace_id: &str) -> Result<Option<Contract>, LedgerError>
where
    S: SpanStore,
    S::Error: Display,
{
    let spans = store
        .trace_spans(trace_id)
        .map_err(|e| LedgerError::Store(e.to_string()))?;

    let Some(created) = spans.iter().find(|s| s.span_type == CREATED_TYPE) else {
        return Ok(None);
    };

    let input = &created.body.input;
    let parties = extract_parties(input);
    let title = extract_title(created, input, &parties);
    let description = extract_description(created, input);
    let (status, completed_at) = resolve_status(&spans);

    Ok(Some(Contract {
        id: trace_id.to_string(),
        title,
        description,
        parties,
        status,
        created_at: created.started_at.clone(),
        updated_at: timestamp::now(),
        completed_at,
        spans: spans.iter().map(|s| s.id.clone()).collect(),
    }))
}

/// Title precedence: explicit `input.title`, then a synthesis from
/// party names, then a prefix of the creation span's id.
fn extract_title(created: &Span, input: &Value, parties: &[Party]) -> String {
    if let Some(title) = input.get("title").and_then(Value::as_str) {
        return title.to_string();
    }
    if !parties.is_empty() {
        let names: Vec<&str> = parties.iter().map(|p| p.name.as_str()).collect();
        return format!("Contrato entre {}", names.join(" e "));
    }
    created.id.prefix(TITLE_ID_PREFIX).to_string()
}

fn extract_description(created: &Span, input: &Value) -> Option<String> {
    if let Some(description) = input.get("description").and_then(Value::as_str) {
        return Some(description.to_string());
    }
    created
        .body
        .metadata
        .as_ref()
        .and_then(|m| m.get("description"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// `input.parties` is a map keyed by role-slot; values carry the
/// party fields. Entries that do not parse as a party are skipped.
fn extract_parties(input: &Value) -> Vec<Party> {
    let Some(map) = input.get("parties").and_then(Value::as_object) else {
        return Vec::new();
    };
    map.values()
        .filter_map(|v| serde_json::from_value::<Party>(v.clone()).ok())
        .collect()
}

/// Status precedence: cancelled > completed > active. The deciding
/// span also supplies `completed_at`, falling back to its start time.
fn resolve_status(spans: &[Span]) -> (ContractStatus, Option<String>) {
    if let Some(cancelled) = spans.iter().find(|s| s.span_type == CANCELLED_TYPE) {
        return (ContractStatus::Cancelled, end_time(cancelled));
    }
    if let Some(completed) = spans.iter().find(|s| s.span_type == COMPLETED_TYPE) {
        return (ContractStatus::Completed, end_time(completed));
    }
    (ContractStatus::Active, None)
}

fn end_time(span: &Span) -> Option<String> {
    span.completed_at
        .clone()
        .or_else(|| Some(span.started_at.clone()))
}
