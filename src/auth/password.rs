//! Password hashing via bcrypt.

use thiserror::Error;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 10;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("bcrypt hash: {0}")]
    Hash(String),
    #[error("bcrypt verify: {0}")]
    Verify(String),
}

/// Hash a password with bcrypt (cost 10).
///
/// # Errors
/// Returns an error if hashing fails.
pub fn hash(password: &str) -> Result<String, PasswordError> {
    bcrypt::hash(password, BCRYPT_COST).map_err(|err| PasswordError::Hash(err.to_string()))
}

/// Verify a password against a bcrypt hash.
///
/// # Errors
/// Returns an error if the stored hash is malformed.
pub fn verify(password: &str, hashed: &str) -> Result<bool, PasswordError> {
    bcrypt::verify(password, hashed).map_err(|err| PasswordError::Verify(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hashed = hash("Secret123").expect("hash password");
        assert!(hashed.starts_with("$2"));
        assert!(verify("Secret123", &hashed).expect("verify password"));
        assert!(!verify("Secret124", &hashed).expect("verify password"));
    }

    #[test]
    fn verify_rejects_malformed_hash() {
        assert!(verify("Secret123", "not-a-hash").is_err());
    }
}
