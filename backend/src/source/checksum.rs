//! Payload fingerprinting used to tell whether a refresh changed the data.

use sha2::{Digest, Sha256};

/// Calculate the SHA-256 checksum of a raw source payload.
///
/// # Returns
/// Hexadecimal string representation of the SHA-256 hash.
pub fn calculate_checksum(payload: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    let result = hasher.finalize();
    hex::encode(result)
}
