/// Refresh Token Digests
///
/// The credential store keeps the SHA-256 digest of the single refresh
/// token that is currently valid for a user, never the token itself.

use sha2::{Digest, Sha256};

/// Hash a refresh token using SHA-256 (hex encoded)
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Whether `presented` is the token whose digest is `stored`
pub fn matches_stored(presented: &str, stored: Option<&str>) -> bool {
    match stored {
        Some(stored) => hash_token(presented) == stored,
        None => false,
    }
}
