//! Offline issuer.
//!
//! Not shipped with the application. Mints keys with [`issue`] and records
//! every key in an [`IssuanceLedger`] so a customer is never issued twice.

pub mod ledger;

use crate::clock::{Clock, SystemClock};
use crate::crypto::digest::key_fingerprint;
use crate::crypto::pipeline::issue;
use crate::IssueError;
use chrono::NaiveDate;
use ledger::{IssuanceLedger, LedgerEntry};
use std::sync::Arc;
use tracing::info;

/// Issues license keys and records them.
pub struct Issuer {
    secret: Vec<u8>,
    ledger: IssuanceLedger,
    clock: Arc<dyn Clock>,
}

impl Issuer {
    /// Create an issuer using the system clock.
    pub fn new(secret: impl Into<Vec<u8>>, ledger: IssuanceLedger) -> Self {
        Self::with_clock(secret, ledger, Arc::new(SystemClock))
    }

    /// Create an issuer with a custom source of "today".
    pub fn with_clock(
        secret: impl Into<Vec<u8>>,
        ledger: IssuanceLedger,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            secret: secret.into(),
            ledger,
            clock,
        }
    }

    /// Issue a key for `identifier` expiring on `expiry` and record it.
    ///
    /// # Errors
    /// * `EmptyIdentifier` - identifier is blank
    /// * `ExpiryInPast` - expiry is before today
    /// * `AlreadyIssued` - the ledger already has this identifier
    /// * `LedgerIO` - the ledger could not be written
    pub fn issue(&mut self, identifier: &str, expiry: NaiveDate) -> Result<LedgerEntry, IssueError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(IssueError::EmptyIdentifier);
        }

        let today = self.clock.today();
        if expiry < today {
            return Err(IssueError::ExpiryInPast { expiry, today });
        }

        if self.ledger.lookup(identifier).is_some() {
            return Err(IssueError::AlreadyIssued {
                identifier: identifier.to_string(),
            });
        }

        let key = issue(identifier, expiry, &self.secret);
        let entry = LedgerEntry {
            identifier: identifier.to_string(),
            key,
            issued_at: today,
            expiry,
        };
        self.ledger.append(entry.clone())?;

        info!(
            identifier,
            key = %key_fingerprint(&entry.key),
            %expiry,
            "issued license"
        );
        Ok(entry)
    }

    /// The ledger backing this issuer.
    pub fn ledger(&self) -> &IssuanceLedger {
        &self.ledger
    }
}
