//! Command implementations.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use pacta_crypto::{decrypt_credential, encrypt_credential, SignerHandle};
use pacta_domain::{timestamp, Credential, Span, SpanQuery, SpanStore, StaticSignerResolver};
use pacta_extractor::extract_spans;
use pacta_ledger::{verify_ledger, Ledger, SignerContext};
use pacta_store::{export_spans, ExportFormat, SqliteStore};

use crate::cli::{
    AppendArgs, CredentialDecryptArgs, CredentialEncryptArgs, ExportArgs, ExtractArgs, KeygenArgs,
    QueryArgs, ShowArgs,
};
use crate::config::Config;
use crate::error::{CliError, Result};

/// Open the ledger at the configured (or overridden) path.
pub fn open_ledger(config: &Config, ledger_override: Option<&Path>) -> Result<Ledger<SqliteStore>> {
    let path = ledger_override.unwrap_or(&config.ledger_path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(Ledger::new(SqliteStore::new(path)?))
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Generate the local signing identity and record it in the config.
pub fn execute_keygen(args: KeygenArgs, config: &mut Config) -> Result<()> {
    if config.key_path.exists() && !args.force {
        return Err(CliError::Config(format!(
            "Key file '{}' already exists; use --force to replace it",
            config.key_path.display()
        )));
    }
    if let Some(parent) = config.key_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let handle = SignerHandle::generate_to_file(&config.key_path)?;
    config.user_id = Some(args.user_id.clone());
    config.save()?;

    println!("Identity for '{}' written to {}", args.user_id, config.key_path.display());
    println!("Public key: {}", handle.public_key());
    Ok(())
}

fn signer_handle(config: &Config) -> Result<SignerHandle> {
    Ok(SignerHandle::load_from_file(&config.key_path)?)
}

/// Append one span from a JSON file or stdin.
pub fn execute_append(
    args: AppendArgs,
    config: &Config,
    ledger_override: Option<&Path>,
) -> Result<()> {
    let text = read_input(args.file.as_ref())?;
    let span: Span = serde_json::from_str(&text)?;

    let mut ledger = open_ledger(config, ledger_override)?;
    let appended = if args.sign {
        let handle = signer_handle(config)?;
        let ctx = SignerContext {
            handle: &handle,
            signer_id: config.require_user_id()?,
            domain: &config.domain,
        };
        ledger.append(span, Some(&ctx))?
    } else {
        ledger.append(span, None)?
    };

    println!("Appended span {} ({})", appended.id, appended.integrity.hash);
    Ok(())
}

/// Extract candidate spans from a model reply; print or append them.
pub fn execute_extract(
    args: ExtractArgs,
    config: &Config,
    ledger_override: Option<&Path>,
) -> Result<()> {
    let text = read_input(args.file.as_ref())?;
    let spans = extract_spans(&text);

    if !args.append {
        println!("{}", serde_json::to_string_pretty(&spans)?);
        return Ok(());
    }

    let mut ledger = open_ledger(config, ledger_override)?;
    let handle = if args.sign { Some(signer_handle(config)?) } else { None };

    let mut appended = 0usize;
    for span in spans {
        let result = match &handle {
            Some(handle) => {
                let ctx = SignerContext {
                    handle,
                    signer_id: config.require_user_id()?,
                    domain: &config.domain,
                };
                ledger.append(span, Some(&ctx))
            }
            None => ledger.append(span, None),
        };
        match result {
            Ok(span) => {
                println!("Appended span {} ({})", span.id, span.integrity.hash);
                appended += 1;
            }
            Err(e) => eprintln!("Skipped span: {}", e),
        }
    }

    println!("Appended {} span(s)", appended);
    Ok(())
}

/// Query spans and print them as a JSON array.
pub fn execute_query(
    args: QueryArgs,
    config: &Config,
    ledger_override: Option<&Path>,
) -> Result<()> {
    let ledger = open_ledger(config, ledger_override)?;
    let query = SpanQuery {
        trace_id: args.trace,
        span_type: args.span_type,
        entity: args.entity,
        signer_id: args.signer,
        from: args.from,
        to: args.to,
        limit: args.limit,
    };
    let spans = ledger.store().query(&query)?;
    println!("{}", serde_json::to_string_pretty(&spans)?);
    Ok(())
}

/// Show the contract view of one trace.
pub fn execute_show(
    args: ShowArgs,
    config: &Config,
    ledger_override: Option<&Path>,
) -> Result<()> {
    let ledger = open_ledger(config, ledger_override)?;
    match ledger.store().contract(&args.trace_id)? {
        Some(contract) => {
            println!("{}", serde_json::to_string_pretty(&contract)?);
            Ok(())
        }
        None => Err(CliError::InvalidInput(format!(
            "No contract view for trace '{}'",
            args.trace_id
        ))),
    }
}

/// List all contract views.
pub fn execute_contracts(config: &Config, ledger_override: Option<&Path>) -> Result<()> {
    let ledger = open_ledger(config, ledger_override)?;
    let contracts = ledger.store().contracts()?;
    for contract in &contracts {
        println!("{}  {}  {}", contract.id, contract.status, contract.title);
    }
    println!("{} contract(s)", contracts.len());
    Ok(())
}

/// Run the full integrity pass and print the report.
pub fn execute_verify(config: &Config, ledger_override: Option<&Path>) -> Result<()> {
    let ledger = open_ledger(config, ledger_override)?;

    // The local identity is the only signer the CLI knows about;
    // other signers' keys would be registered here once exchanged.
    let mut resolver = StaticSignerResolver::new();
    if config.key_path.exists() {
        if let (Ok(handle), Some(user_id)) = (signer_handle(config), config.user_id.as_deref()) {
            resolver.register(user_id, handle.public_key());
        }
    }

    let report = verify_ledger(ledger.store(), &resolver)?;
    println!("Examined {} span(s)", report.total);
    for finding in &report.errors {
        println!("  {}", finding);
    }

    if report.valid {
        println!("Ledger is valid");
        Ok(())
    } else {
        Err(CliError::IntegrityFailed(report.errors.len()))
    }
}

/// Export all spans in the requested format.
pub fn execute_export(
    args: ExportArgs,
    config: &Config,
    ledger_override: Option<&Path>,
) -> Result<()> {
    let format: ExportFormat = args.format.parse()?;
    let ledger = open_ledger(config, ledger_override)?;
    let spans = ledger.store().all_spans()?;
    let rendered = export_spans(&spans, format)?;

    match args.output {
        Some(path) => {
            fs::write(&path, rendered)?;
            println!("Exported {} span(s) to {}", spans.len(), path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

/// Encrypt an API key (read from stdin) into a credential record.
pub fn execute_credential_encrypt(args: CredentialEncryptArgs, config: &Config) -> Result<()> {
    let user_id = config.require_user_id()?;
    let plaintext = read_input(None)?;
    let plaintext = plaintext.trim();
    if plaintext.is_empty() {
        return Err(CliError::InvalidInput("Empty API key".into()));
    }

    let credential = Credential {
        user_id: user_id.to_string(),
        encrypted_key: encrypt_credential(plaintext, user_id)?,
        provider: args.provider,
        model: args.model,
        created_at: timestamp::now(),
    };
    println!("{}", serde_json::to_string_pretty(&credential)?);
    Ok(())
}

/// Decrypt a credential record and print the plaintext key.
///
/// The record's own `user_id` is the derivation input; the local
/// identity is irrelevant here, a credential decrypts for whoever
/// holds the file.
pub fn execute_credential_decrypt(args: CredentialDecryptArgs) -> Result<()> {
    let text = read_input(args.file.as_ref())?;
    let credential: Credential = serde_json::from_str(&text)?;

    let plaintext = decrypt_credential(&credential.encrypted_key, &credential.user_id)?;
    println!("{}", plaintext);
    Ok(())
}
