//! Pacta Ledger Layer
//!
//! The write path and the read-only integrity surface of the span
//! ledger:
//!
//! - [`Ledger::append`] fills in a span's content hash, optionally
//!   signs it with an explicit signer context, persists it, and
//!   reprojects the contract view of its trace.
//! - [`projector::project`] folds all spans of one trace into a
//!   contract summary.
//! - [`verifier::verify_ledger`] re-validates hashes, signatures, and
//!   parent references across the whole ledger and returns a complete
//!   report - it never stops at the first failure.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod ledger;
pub mod projector;
pub mod verifier;

pub use error::LedgerError;
pub use ledger::{Ledger, SignerContext};
pub use projector::project;
pub use verifier::{verify_ledger, IntegrityError, LedgerReport};
