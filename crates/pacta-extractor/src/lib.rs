//! Pacta Extraction Layer
//!
//! Parses candidate spans out of free-form model output. This is an
//! untrusted-input parser: content is only structurally parsed and
//! validated, never evaluated. A malformed block costs that block
//! alone; extraction always completes.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod parser;

pub use parser::{extract_candidates, extract_spans, is_valid_span};
