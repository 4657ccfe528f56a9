//! HMAC-SHA256 signing of payload segments.
//!
//! The tag is computed over the encoded segment bytes, not the JSON, and
//! is itself carried as unpadded base64url.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Compute the signature segment for a payload segment.
pub fn sign(segment: &str, secret: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length");
    mac.update(segment.as_bytes());
    URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
}

/// Check a signature segment against a payload segment.
///
/// Recomputes the tag and compares in constant time.
pub fn verify(segment: &str, signature_segment: &str, secret: &[u8]) -> bool {
    let expected = sign(segment, secret);
    expected
        .as_bytes()
        .ct_eq(signature_segment.as_bytes())
        .into()
}
