//! SHA-256 key fingerprints.
//!
//! Full license keys are never written to logs. A short fingerprint is
//! enough to correlate log lines and ledger entries.

use sha2::{Digest, Sha256};

/// Number of hex characters kept in a fingerprint.
pub const FINGERPRINT_LEN: usize = 16;

/// Compute a hex SHA-256 hash of the license key.
pub fn hash_license_key(license_key: &str) -> String {
    let hash = Sha256::digest(license_key.as_bytes());
    hex::encode(hash)
}

/// Short, log-safe fingerprint of a license key.
pub fn key_fingerprint(license_key: &str) -> String {
    let mut hash = hash_license_key(license_key);
    hash.truncate(FINGERPRINT_LEN);
    hash
}
