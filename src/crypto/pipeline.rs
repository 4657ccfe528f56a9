//! Issue and verification pipeline composing codec and signature checks.
//!
//! Verification order:
//! 1. Split the key into exactly two segments
//! 2. Decode the payload segment
//! 3. Verify the HMAC tag (gates all trust in the payload)
//! 4. Parse the expiry date strictly
//! 5. Reject when the expiry has passed

use crate::crypto::signing::{sign, verify};
use crate::protocol::codec::{decode, encode};
use crate::protocol::models::{LicenseKey, LicensePayload};
use crate::LicenseError;
use chrono::NaiveDate;

/// Issue a license key for a customer.
///
/// Encodes the payload, signs the encoded segment and joins both with `.`.
pub fn issue(identifier: &str, expiry: NaiveDate, secret: &[u8]) -> String {
    let payload_segment = encode(&LicensePayload::new(identifier, expiry));
    let signature_segment = sign(&payload_segment, secret);
    LicenseKey {
        payload_segment,
        signature_segment,
    }
    .to_string()
}

/// Verify a license key string.
///
/// # Returns
/// * `Ok(payload)` - Key is authentic and `expiry >= today`
/// * `Err(MalformedKey)` - Wrong segment count or undecodable payload
/// * `Err(InvalidSignature)` - Tag does not match (tampered or wrong secret)
/// * `Err(MalformedExpiry)` - Signed expiry is not a `YYYY-MM-DD` date
/// * `Err(Expired)` - Expiry is before `today`; payload attached
pub fn verify_key(
    key: &str,
    secret: &[u8],
    today: NaiveDate,
) -> Result<LicensePayload, LicenseError> {
    let key = LicenseKey::parse(key)?;
    verify_license_key(&key, secret, today)
}

/// Verify an already-split license key.
pub fn verify_license_key(
    key: &LicenseKey,
    secret: &[u8],
    today: NaiveDate,
) -> Result<LicensePayload, LicenseError> {
    // 1. Decode (only to reject garbage early; nothing is trusted yet)
    let payload = decode(&key.payload_segment)?;

    // 2. Signature over the encoded segment bytes
    if !verify(&key.payload_segment, &key.signature_segment, secret) {
        return Err(LicenseError::InvalidSignature);
    }

    // 3. Expiry
    let expiry = payload.expiry_date()?;
    if expiry < today {
        return Err(LicenseError::Expired { payload });
    }

    Ok(payload)
}
