//! CLI command definitions and argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Pacta - an append-only, signed ledger of contract spans.
#[derive(Debug, Parser)]
#[command(name = "pacta")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Ledger database path (overrides config)
    #[arg(long, global = true)]
    pub ledger: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate the local signing identity
    Keygen(KeygenArgs),

    /// Append a span from a JSON file or stdin
    Append(AppendArgs),

    /// Extract candidate spans from a model reply
    Extract(ExtractArgs),

    /// Query spans
    Query(QueryArgs),

    /// Show the contract view of one trace
    Show(ShowArgs),

    /// List all contract views
    Contracts,

    /// Verify the integrity of the whole ledger
    Verify,

    /// Export all spans
    Export(ExportArgs),

    /// Encrypt or decrypt a model-provider credential
    #[command(subcommand)]
    Credential(CredentialCommand),
}

/// Arguments for the keygen command.
#[derive(Debug, Parser)]
pub struct KeygenArgs {
    /// Signer id to bind the identity to
    pub user_id: String,

    /// Overwrite an existing key file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the append command.
#[derive(Debug, Parser)]
pub struct AppendArgs {
    /// Path to a span JSON file (reads stdin when omitted)
    pub file: Option<PathBuf>,

    /// Sign the span with the local identity
    #[arg(short, long)]
    pub sign: bool,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Path to a text file with the model reply (reads stdin when omitted)
    pub file: Option<PathBuf>,

    /// Append the extracted spans to the ledger instead of printing them
    #[arg(short, long)]
    pub append: bool,

    /// Sign appended spans with the local identity
    #[arg(short, long, requires = "append")]
    pub sign: bool,
}

/// Arguments for the query command.
#[derive(Debug, Parser)]
pub struct QueryArgs {
    /// Filter by trace id
    #[arg(short, long)]
    pub trace: Option<String>,

    /// Filter by span type (dotted event name)
    #[arg(short = 'T', long = "type")]
    pub span_type: Option<String>,

    /// Filter by entity category
    #[arg(short, long)]
    pub entity: Option<String>,

    /// Filter by signer id
    #[arg(short, long)]
    pub signer: Option<String>,

    /// Inclusive lower bound on started_at (RFC 3339)
    #[arg(long)]
    pub from: Option<String>,

    /// Inclusive upper bound on started_at (RFC 3339)
    #[arg(long)]
    pub to: Option<String>,

    /// Maximum number of results
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for the show command.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Trace id of the contract
    pub trace_id: String,
}

/// Arguments for the export command.
#[derive(Debug, Parser)]
pub struct ExportArgs {
    /// Output format: ndjson, json, or csv
    #[arg(short, long, default_value = "ndjson")]
    pub format: String,

    /// Output file (writes stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Credential subcommands.
#[derive(Debug, Subcommand)]
pub enum CredentialCommand {
    /// Encrypt an API key read from stdin
    Encrypt(CredentialEncryptArgs),

    /// Decrypt a stored credential read from a file or stdin
    Decrypt(CredentialDecryptArgs),
}

/// Arguments for credential encryption.
#[derive(Debug, Parser)]
pub struct CredentialEncryptArgs {
    /// Provider name (e.g. openai)
    pub provider: String,

    /// Preferred model
    #[arg(short, long)]
    pub model: Option<String>,
}

/// Arguments for credential decryption.
#[derive(Debug, Parser)]
pub struct CredentialDecryptArgs {
    /// Path to a credential JSON file (reads stdin when omitted)
    pub file: Option<PathBuf>,
}
