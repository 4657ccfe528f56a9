//! Gatekey error types.

use crate::protocol::models::LicensePayload;
use thiserror::Error;

/// Errors produced when decoding a payload segment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Segment is not valid unpadded URL-safe base64.
    #[error("payload is not valid base64url")]
    BadBase64,

    /// Decoded bytes are not a JSON object of the expected shape.
    #[error("payload is not valid JSON: {0}")]
    BadJson(String),

    /// A required field is absent or empty.
    #[error("payload is missing field `{0}`")]
    MissingField(&'static str),
}

/// Reasons a license key or trial cannot grant access.
///
/// Every variant is recoverable: the user can enter another key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LicenseError {
    /// Wrong segment count, bad base64, bad JSON or a missing field.
    #[error("License key is malformed: {0}")]
    MalformedKey(String),

    /// Signature does not match the payload (tampered, or wrong secret).
    #[error("License key signature is invalid")]
    InvalidSignature,

    /// Signed payload carries an expiry that is not a `YYYY-MM-DD` date.
    #[error("License expiry date is malformed: {0}")]
    MalformedExpiry(String),

    /// License is authentic but its expiry date has passed.
    #[error("License for {} expired on {}", .payload.identifier, .payload.expiry)]
    Expired {
        /// The verified payload, kept for diagnostics.
        payload: LicensePayload,
    },

    /// The trial window has elapsed.
    #[error("Trial period has ended")]
    TrialExpired,

    /// Trial marker present but no installation date was ever recorded.
    #[error("Trial was never started on this installation")]
    TrialNeverStarted,
}

impl From<DecodeError> for LicenseError {
    fn from(err: DecodeError) -> Self {
        LicenseError::MalformedKey(err.to_string())
    }
}

/// Errors raised by the activation gate and its store.
#[derive(Debug, Error)]
pub enum GateError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Activation store I/O error.
    #[error("Activation store I/O error: {0}")]
    StoreIO(String),

    /// Activation store content could not be understood.
    #[error("Activation store is corrupt: {0}")]
    StoreCorrupt(String),

    /// An operation was attempted in a state that does not allow it.
    #[error("Cannot {action} while gate is {state}")]
    InvalidTransition {
        /// The attempted operation.
        action: &'static str,
        /// Name of the current state.
        state: &'static str,
    },

    /// No license or trial has been activated on this installation.
    #[error("No license has been activated")]
    NotActivated,

    /// The stored license or trial does not grant access.
    #[error(transparent)]
    License(#[from] LicenseError),
}

/// Errors raised by the offline issuer.
#[derive(Debug, Error)]
pub enum IssueError {
    /// Identifier is empty or whitespace.
    #[error("Identifier cannot be empty")]
    EmptyIdentifier,

    /// Requested expiry lies before the issue date.
    #[error("Expiry {expiry} is before today ({today})")]
    ExpiryInPast {
        /// Requested expiry.
        expiry: chrono::NaiveDate,
        /// Issue date.
        today: chrono::NaiveDate,
    },

    /// A key has already been issued to this identifier.
    #[error("A license was already issued to {identifier}")]
    AlreadyIssued {
        /// The identifier that already has a ledger entry.
        identifier: String,
    },

    /// Ledger I/O error.
    #[error("Ledger I/O error: {0}")]
    LedgerIO(String),

    /// A ledger line could not be parsed.
    #[error("Ledger line {line} is corrupt: {reason}")]
    LedgerCorrupt {
        /// 1-based line number.
        line: usize,
        /// Parser message.
        reason: String,
    },
}
