//! Cache keys for claim text.
//!
//! The key is the lowercase hex SHA-256 of the exact UTF-8 bytes of the claim.
//! No trimming or case folding: `"Sky"` and `"sky "` are different facts.

use sha2::{Digest, Sha256};

/// Length of a fingerprint in hex characters.
pub const FINGERPRINT_LEN: usize = 64;

pub fn fingerprint(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}
