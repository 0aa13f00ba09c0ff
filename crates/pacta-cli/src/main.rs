//! Pacta CLI - command-line interface for the span ledger.

use clap::Parser;
use pacta_cli::{commands, Cli, Command, Config};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> pacta_cli::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load().unwrap_or_default();
    let ledger_override = cli.ledger.as_deref();

    match cli.command {
        Command::Keygen(args) => commands::execute_keygen(args, &mut config),
        Command::Append(args) => commands::execute_append(args, &config, ledger_override),
        Command::Extract(args) => commands::execute_extract(args, &config, ledger_override),
        Command::Query(args) => commands::execute_query(args, &config, ledger_override),
        Command::Show(args) => commands::execute_show(args, &config, ledger_override),
        Command::Contracts => commands::execute_contracts(&config, ledger_override),
        Command::Verify => commands::execute_verify(&config, ledger_override),
        Command::Export(args) => commands::execute_export(args, &config, ledger_override),
        Command::Credential(cmd) => match cmd {
            pacta_cli::cli::CredentialCommand::Encrypt(args) => {
                commands::execute_credential_encrypt(args, &config)
            }
            pacta_cli::cli::CredentialCommand::Decrypt(args) => {
                commands::execute_credential_decrypt(args)
            }
        },
    }
}
