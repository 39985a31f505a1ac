//! Password digests for the in-memory user store.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest of a password.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn verify_password(password: &str, digest: &str) -> bool {
    hash_password(password) == digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            hash_password("demo"),
            "2a97516c354b68848cdbd8f54a226a0a55b21ed138e207ad6c5cbb9c00aa5aea"
        );
    }

    #[test]
    fn test_verify() {
        let digest = hash_password("secret");
        assert!(verify_password("secret", &digest));
        assert!(!verify_password("Secret", &digest));
    }
}
