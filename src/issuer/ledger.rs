//! Append-only issuance ledger.
//!
//! One JSON object per line. Each identifier appears at most once; the
//! ledger is how the issuer refuses to mint a second key for a customer.
//!
//! Every append is a single newline-terminated write. If the process dies
//! mid-write, the file ends in an unterminated line and [`IssuanceLedger::open`]
//! reports it as `LedgerCorrupt` naming that line. Delete the partial line
//! to recover; no other entry is affected.

use crate::IssueError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the ledger inside a namespace directory.
pub const LEDGER_FILE: &str = "ledger.jsonl";

/// A single issued license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Customer email or name, as embedded in the key.
    pub identifier: String,
    /// The issued license key.
    pub key: String,
    /// Day the key was issued.
    pub issued_at: NaiveDate,
    /// Expiry embedded in the key.
    pub expiry: NaiveDate,
}

/// Identifiers are unique ignoring case and surrounding whitespace.
fn same_identifier(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// File-backed append-only ledger.
#[derive(Debug)]
pub struct IssuanceLedger {
    /// Path to the ledger file.
    path: PathBuf,
    /// Entries loaded from disk plus those appended since.
    entries: Vec<LedgerEntry>,
}

impl IssuanceLedger {
    /// Open the ledger at the given path. A missing file is an empty ledger.
    ///
    /// # Errors
    /// * `LedgerIO` - file exists but cannot be read
    /// * `LedgerCorrupt` - a line is not a valid entry, or repeats an identifier
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, IssueError> {
        let path = path.into();
        let mut entries: Vec<LedgerEntry> = Vec::new();

        if path.exists() {
            let text = fs::read_to_string(&path)
                .map_err(|e| IssueError::LedgerIO(format!("Failed to read ledger: {}", e)))?;

            let line_count = text.lines().count();
            let torn_tail = !text.is_empty() && !text.ends_with('\n');

            for (index, line) in text.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let entry: LedgerEntry =
                    serde_json::from_str(line).map_err(|e| IssueError::LedgerCorrupt {
                        line: index + 1,
                        reason: if torn_tail && index + 1 == line_count {
                            format!("unterminated final line, likely an interrupted write ({})", e)
                        } else {
                            e.to_string()
                        },
                    })?;
                if entries
                    .iter()
                    .any(|existing| same_identifier(&existing.identifier, &entry.identifier))
                {
                    return Err(IssueError::LedgerCorrupt {
                        line: index + 1,
                        reason: format!("duplicate identifier {}", entry.identifier),
                    });
                }
                entries.push(entry);
            }
        }

        debug!(path = %path.display(), entries = entries.len(), "opened issuance ledger");
        Ok(Self { path, entries })
    }

    /// Open the ledger under `dirs::data_dir()/<namespace>/ledger.jsonl`.
    pub fn with_namespace(namespace: &str) -> Result<Self, IssueError> {
        let base_dir = dirs::data_dir()
            .ok_or_else(|| IssueError::LedgerIO("Could not find data directory".to_string()))?;
        Self::open(base_dir.join(namespace).join(LEDGER_FILE))
    }

    /// Path of the ledger file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries in issue order.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Find the entry for an identifier.
    pub fn lookup(&self, identifier: &str) -> Option<&LedgerEntry> {
        self.entries
            .iter()
            .find(|entry| same_identifier(&entry.identifier, identifier))
    }

    /// Append an entry and flush it to disk.
    ///
    /// # Errors
    /// * `AlreadyIssued` - identifier already present; nothing is written
    /// * `LedgerIO` - the line could not be written
    pub fn append(&mut self, entry: LedgerEntry) -> Result<(), IssueError> {
        if self.lookup(&entry.identifier).is_some() {
            return Err(IssueError::AlreadyIssued {
                identifier: entry.identifier,
            });
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| IssueError::LedgerIO(format!("Failed to create dir: {}", e)))?;
        }

        let mut line = serde_json::to_string(&entry)
            .map_err(|e| IssueError::LedgerIO(format!("Failed to serialize: {}", e)))?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| IssueError::LedgerIO(format!("Failed to open ledger: {}", e)))?;
        file.write_all(line.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|e| IssueError::LedgerIO(format!("Failed to append: {}", e)))?;

        self.entries.push(entry);
        Ok(())
    }
}
