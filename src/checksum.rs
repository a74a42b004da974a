//! Content checksums
//!
//! Uses SHA-256 over the raw content bytes, rendered as lowercase hex.

use sha2::{Digest, Sha256};

/// Length of a rendered checksum in hex characters
pub const CHECKSUM_HEX_LEN: usize = 64;

/// Compute the SHA-256 checksum of bytes
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Shorten a checksum for display, e.g. `b94d27b9934d…`
pub fn short_checksum(checksum: &str, len: usize) -> String {
    match checksum.get(..len) {
        Some(prefix) if len < checksum.len() => format!("{}…", prefix),
        _ => checksum.to_string(),
    }
}
