//! Pacta CLI library
//!
//! Command-line surface over the span ledger: key management, span
//! appends, queries, contract views, integrity verification, export,
//! extraction from model replies, and credential encryption.

#![warn(clippy::all)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
