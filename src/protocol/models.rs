//! License key data models.
//!
//! These types model the license key wire format:
//!
//! ```text
//! <base64url(json({"email": .., "exp": "YYYY-MM-DD"}))>.<base64url(HMAC-SHA256(secret, payload_segment))>
//! ```
//!
//! plus the reserved [`TRIAL_MARKER`] literal.

use crate::LicenseError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved key value that activates the time-boxed trial.
pub const TRIAL_MARKER: &str = "TRIAL-000000000000";

/// Date format used for expiry and installation dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The unsigned license content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicensePayload {
    /// Customer email or name.
    #[serde(rename = "email")]
    pub identifier: String,

    /// Expiry date as `YYYY-MM-DD` text, exactly as carried on the wire.
    #[serde(rename = "exp")]
    pub expiry: String,
}

impl LicensePayload {
    /// Create a payload for the given customer and expiry date.
    pub fn new(identifier: impl Into<String>, expiry: NaiveDate) -> Self {
        Self {
            identifier: identifier.into(),
            expiry: format_date(expiry),
        }
    }

    /// Parse the expiry as a strict calendar date.
    pub fn expiry_date(&self) -> Result<NaiveDate, LicenseError> {
        parse_date(&self.expiry).ok_or_else(|| LicenseError::MalformedExpiry(self.expiry.clone()))
    }
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a strict `YYYY-MM-DD` date.
///
/// Rejects anything that does not re-format to the same text, so
/// `2030-1-1` or `2030-01-01T00:00` are not accepted.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(text, DATE_FORMAT).ok()?;
    (format_date(date) == text).then_some(date)
}

/// A signed license key split into its two segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseKey {
    /// Base64url canonical JSON payload.
    pub payload_segment: String,
    /// Base64url HMAC-SHA256 tag over `payload_segment`.
    pub signature_segment: String,
}

impl LicenseKey {
    /// Split a key string into segments.
    ///
    /// Exactly one `.` must be present.
    pub fn parse(key: &str) -> Result<Self, LicenseError> {
        let mut parts = key.split('.');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(payload), Some(signature), None) => Ok(Self {
                payload_segment: payload.to_string(),
                signature_segment: signature.to_string(),
            }),
            _ => Err(LicenseError::MalformedKey(
                "expected exactly two '.'-separated segments".to_string(),
            )),
        }
    }
}

impl fmt::Display for LicenseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.payload_segment, self.signature_segment)
    }
}

/// What a candidate or stored key string turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LicenseSource {
    /// The reserved trial marker.
    Trial,
    /// A signed key (not yet verified).
    Signed(LicenseKey),
}

impl LicenseSource {
    /// Classify a key string once, trimming surrounding whitespace.
    ///
    /// The trial marker is recognized by equality before any segment
    /// splitting is attempted.
    pub fn parse(candidate: &str) -> Result<Self, LicenseError> {
        let candidate = candidate.trim();
        if candidate == TRIAL_MARKER {
            return Ok(LicenseSource::Trial);
        }
        LicenseKey::parse(candidate).map(LicenseSource::Signed)
    }

    /// The string to persist for this source.
    pub fn to_key_string(&self) -> String {
        match self {
            LicenseSource::Trial => TRIAL_MARKER.to_string(),
            LicenseSource::Signed(key) => key.to_string(),
        }
    }

    /// Whether this is the trial marker.
    pub fn is_trial(&self) -> bool {
        matches!(self, LicenseSource::Trial)
    }
}
