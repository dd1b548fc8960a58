//! One-way hashing of secrets before they are persisted or looked up

use constant_time_eq::constant_time_eq;
use sha2::{Digest, Sha256};

/// SHA-256 of the UTF-8 bytes, as 64 lower-case hex characters.
///
/// Total: the empty string hashes like any other input.
pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-time comparison of two hex digests
pub fn hashes_match(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    constant_time_eq(a.as_bytes(), b.as_bytes())
}
