//! `attestor` — verify signed attestation envelopes from the command line.

use anyhow::{Context, Result};
use attestor_core::{read_from_path, Certificate, CertificateError, HashAlgorithm, Verifier, VerifierOptions};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "attestor",
    version,
    about = "Verify signed attestation envelopes against caller-supplied trust anchors"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Verify an envelope file against one or more trusted root certificates
    Verify(VerifyArgs),
}

#[derive(clap::Args)]
struct VerifyArgs {
    /// Path to the envelope JSON file
    envelope: PathBuf,

    /// Trusted root certificate file (PEM or base64 DER); may be repeated
    #[arg(long = "root", value_name = "CERT", required = true)]
    roots: Vec<PathBuf>,

    /// Evaluation time for certificate validity (ISO-8601; defaults to now)
    #[arg(long, value_name = "TIMESTAMP")]
    time: Option<String>,

    /// Default hash algorithm: SHA256, SHA384 or SHA512
    #[arg(long, value_name = "ALG")]
    hash: Option<String>,
}

fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fatal: {e:#}");
            2
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.cmd {
        Command::Verify(args) => run_verify(args),
    }
}

fn run_verify(args: VerifyArgs) -> Result<i32> {
    let evaluation_time = match &args.time {
        Some(value) => DateTime::parse_from_rfc3339(value)
            .with_context(|| format!("unable to parse --time value '{value}'"))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    // Unknown --hash values fall back to SHA256 silently; the envelope-level
    // fallback (with a warning) is a separate mechanism.
    let default_hash_algorithm = args
        .hash
        .as_deref()
        .and_then(HashAlgorithm::parse)
        .unwrap_or_default();

    let trusted_roots = args
        .roots
        .iter()
        .map(Certificate::from_path)
        .collect::<Result<Vec<_>, CertificateError>>()?;

    let envelope = read_from_path(&args.envelope)?;
    let verifier = Verifier::new(VerifierOptions {
        trusted_roots,
        evaluation_time,
        default_hash_algorithm,
    });
    let result = verifier.verify(&envelope);

    println!("Chain valid: {}", result.chain_valid);
    println!("Signature valid: {}", result.signature_valid);
    println!("Overall valid: {}", result.is_valid());
    println!("Leaf subject: {}", result.leaf_certificate.subject());

    match &result.payload_json {
        Some(json) => {
            println!("Payload JSON:");
            println!("{json}");
        }
        None => println!("Payload (base64): {}", BASE64.encode(&result.payload)),
    }

    if !result.errors.is_empty() {
        println!("Errors:");
        for error in &result.errors {
            println!(" - {error}");
        }
    }

    Ok(if result.is_valid() { 0 } else { 1 })
}
