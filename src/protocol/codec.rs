//! Canonical payload segment codec.
//!
//! A payload segment is compact JSON with a fixed key order
//! (`email`, then `exp`), encoded as URL-safe base64 without padding.
//! The signature covers the segment bytes, so encoding must be stable.

use crate::protocol::models::LicensePayload;
use crate::DecodeError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

/// Lenient shape used for decoding. Unknown fields are ignored.
#[derive(Deserialize)]
struct WirePayload {
    email: Option<String>,
    exp: Option<String>,
}

/// Encode a payload into its canonical segment.
pub fn encode(payload: &LicensePayload) -> String {
    // Built by hand so the key order is fixed regardless of serde_json features.
    let json = format!(
        "{{\"email\":{},\"exp\":{}}}",
        serde_json::Value::from(payload.identifier.as_str()),
        serde_json::Value::from(payload.expiry.as_str()),
    );
    URL_SAFE_NO_PAD.encode(json.as_bytes())
}

/// Decode a payload segment.
///
/// # Errors
/// * `BadBase64` - not unpadded URL-safe base64
/// * `BadJson` - not UTF-8 JSON object, or a field has the wrong type
/// * `MissingField` - `email` or `exp` absent or empty
pub fn decode(segment: &str) -> Result<LicensePayload, DecodeError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| DecodeError::BadBase64)?;

    let wire: WirePayload =
        serde_json::from_slice(&bytes).map_err(|e| DecodeError::BadJson(e.to_string()))?;

    let identifier = wire
        .email
        .filter(|s| !s.is_empty())
        .ok_or(DecodeError::MissingField("email"))?;
    let expiry = wire
        .exp
        .filter(|s| !s.is_empty())
        .ok_or(DecodeError::MissingField("exp"))?;

    Ok(LicensePayload { identifier, expiry })
}
