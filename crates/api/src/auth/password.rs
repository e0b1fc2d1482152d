//! Argon2id password hashing and strength checks.
//!
//! Hashes are stored in PHC string format, so algorithm parameters and salt
//! travel with the hash.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use modiste_core::account::MIN_PASSWORD_LENGTH;
use modiste_core::error::CoreError;

/// Upper bound on password length; hashing cost grows with input size.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Hash a plaintext password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC hash.
///
/// Returns `Ok(false)` on mismatch; `Err` only for a malformed hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Reject passwords outside `[MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH]`.
pub fn validate_password_strength(password: &str) -> Result<(), CoreError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at most {MAX_PASSWORD_LENGTH} characters long"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hash = hash_password("linen-and-silk").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("linen-and-silk", &hash).unwrap());
        assert!(!verify_password("linen-and-wool", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn strength_bounds() {
        assert!(validate_password_strength("short").is_err());
        assert!(validate_password_strength("exactly8").is_ok());
        assert!(validate_password_strength(&"x".repeat(MAX_PASSWORD_LENGTH + 1)).is_err());
    }
}
