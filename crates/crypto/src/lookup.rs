//! Keyed lookup hashes for equality search over encrypted columns.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::KEY_LENGTH;

type HmacSha256 = Hmac<Sha256>;

/// Returns the base64 HMAC-SHA-256 of `value`, or an empty string when the
/// signing key is not exactly 32 bytes.
#[must_use]
pub fn compute_lookup_hash(value: &str, signing_key: &[u8]) -> String {
    compute_lookup_hash_bytes(value, signing_key)
        .map(|digest| STANDARD.encode(digest))
        .unwrap_or_default()
}

/// Returns the raw HMAC-SHA-256 digest stored in lookup columns.
#[must_use]
pub fn compute_lookup_hash_bytes(value: &str, signing_key: &[u8]) -> Option<[u8; 32]> {
    if signing_key.len() != KEY_LENGTH {
        return None;
    }

    let mut mac = HmacSha256::new_from_slice(signing_key).ok()?;
    mac.update(value.as_bytes());

    let mut digest = [0u8; 32];
    digest.copy_from_slice(&mac.finalize().into_bytes());
    Some(digest)
}
