use sha2::{Digest, Sha256};

/// Hex encoded SHA-256 of `data`, used as a template fingerprint.
pub fn calculate_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
