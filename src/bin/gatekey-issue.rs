//! Offline license issuer.
//!
//! Mints license keys and records them in an append-only ledger.
//! Never ship this binary (or the secret) to customers.
//!
//! Usage:
//!   gatekey-issue issue a@b.com 2026-12-31
//!   gatekey-issue verify <KEY>
//!   gatekey-issue list

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use gatekey::crypto::digest::key_fingerprint;
use gatekey::issuer::ledger::IssuanceLedger;
use gatekey::issuer::Issuer;
use gatekey::protocol::models::parse_date;
use gatekey::{verify_key, Clock, LicenseError, SystemClock};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Ledger namespace under the platform data directory.
const LEDGER_NAMESPACE: &str = "gatekey";

#[derive(Parser, Debug)]
#[command(name = "gatekey-issue")]
#[command(about = "Issue and inspect offline license keys")]
struct Args {
    /// HMAC secret shared with the shipped application
    #[arg(long, env = "GATEKEY_SECRET", hide_env_values = true)]
    secret: String,

    /// Path to the issuance ledger [default: <data dir>/gatekey/ledger.jsonl]
    #[arg(long)]
    ledger: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Issue a key and record it in the ledger
    Issue {
        /// Customer email or name
        identifier: String,
        /// Last valid day, YYYY-MM-DD
        #[arg(value_parser = parse_expiry)]
        expiry: NaiveDate,
    },
    /// Verify a key against the secret and today's date
    Verify {
        /// License key to check
        key: String,
    },
    /// List ledger entries
    List,
}

fn parse_expiry(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).ok_or_else(|| format!("expected YYYY-MM-DD, got {:?}", s))
}

fn open_ledger(path: Option<&PathBuf>) -> Result<IssuanceLedger> {
    let ledger = match path {
        Some(path) => IssuanceLedger::open(path),
        None => IssuanceLedger::with_namespace(LEDGER_NAMESPACE),
    }
    .context("opening ledger")?;
    debug!(ledger = %ledger.path().display(), "ledger ready");
    Ok(ledger)
}

fn main() -> Result<()> {
    let args = Args::parse();
    // RUST_LOG wins over --verbose
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    if args.secret.is_empty() {
        bail!("secret cannot be empty");
    }

    match args.command {
        Command::Issue { identifier, expiry } => {
            let ledger = open_ledger(args.ledger.as_ref())?;
            let mut issuer = Issuer::new(args.secret.into_bytes(), ledger);
            let entry = issuer
                .issue(&identifier, expiry)
                .with_context(|| format!("issuing license for {}", identifier))?;
            println!("{}", entry.key);
        }
        Command::Verify { key } => {
            let today = SystemClock.today();
            match verify_key(key.trim(), args.secret.as_bytes(), today) {
                Ok(payload) => {
                    println!("valid: {} (expires {})", payload.identifier, payload.expiry);
                }
                Err(LicenseError::Expired { payload }) => {
                    bail!("expired: {} (expired {})", payload.identifier, payload.expiry);
                }
                Err(err) => bail!("invalid: {}", err),
            }
        }
        Command::List => {
            let ledger = open_ledger(args.ledger.as_ref())?;
            for entry in ledger.entries() {
                println!(
                    "{}\t{}\t{}\t{}",
                    entry.identifier,
                    entry.issued_at,
                    entry.expiry,
                    key_fingerprint(&entry.key)
                );
            }
        }
    }

    Ok(())
}
