//! The ledger append path
//!
//! Appending several related spans is a sequence of independent
//! atomic appends, not a transaction: a crash between them leaves a
//! partial trace, and every consumer treats the absence of a
//! `contract.created` span as "no contract yet".

use std::fmt::Display;

use pacta_crypto::{sign_span, span_hash, SignerHandle};
use pacta_domain::{Span, SpanStore};
use tracing::debug;

use crate::error::LedgerError;
use crate::projector::project;

/// Entity category whose appends trigger contract reprojection
const CONTRACT_ENTITY: &str = "minicontrato";

/// Explicit signing context for an append.
///
/// Passed per call rather than read from ambient state, so the
/// identity that confirms a span is always visible at the call site.
pub struct SignerContext<'a> {
    /// The signing capability
    pub handle: &'a SignerHandle,
    /// Identifier recorded as `confirmation.signer_id`
    pub signer_id: &'a str,
    /// Signing context recorded as `confirmation.domain`
    pub domain: &'a str,
}

/// The span ledger: an append-only store plus the hash/sign/project
/// write path.
pub struct Ledger<S> {
    store: S,
}

impl<S> Ledger<S>
where
    S: SpanStore,
    S::Error: Display,
{
    /// Wrap a span store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read access to the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the underlying store
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Append a span to the ledger.
    ///
    /// With a signer context, the span is signed; `sign_span` attaches
    /// the confirmation and owns the hash, since the digest covers the
    /// confirmation metadata. Without one, `integrity.hash` is filled
    /// if blank. The span is then persisted (a duplicate id surfaces
    /// immediately as a store error) and the trace's contract view is
    /// reprojected when the span belongs to the contract entity.
    ///
    /// Returns the span as persisted.
    pub fn append(
        &mut self,
        mut span: Span,
        signer: Option<&SignerContext<'_>>,
    ) -> Result<Span, LedgerError> {
        if let Some(ctx) = signer {
            sign_span(&mut span, ctx.handle, ctx.signer_id, ctx.domain)?;
        } else if span.integrity.hash.is_empty() {
            span.integrity.hash = span_hash(&span)?;
        }

        self.store
            .append(&span)
            .map_err(|e| LedgerError::Store(e.to_string()))?;
        debug!(span_id = %span.id, trace_id = %span.trace_id, "span appended");

        if span.entity == CONTRACT_ENTITY {
            self.reproject(&span.trace_id)?;
        }

        Ok(span)
    }

    /// Recompute and persist the contract view for a trace.
    ///
    /// No-op when the trace has no `contract.created` span yet.
    pub fn reproject(&mut self, trace_id: &str) -> Result<(), LedgerError> {
        if let Some(contract) = project(&self.store, trace_id)? {
            debug!(trace_id, status = %contract.status, "contract view updated");
            self.store
                .upsert_contract(&contract)
                .map_err(|e| LedgerError::Store(e.to_string()))?;
        }
        Ok(())
    }
}
