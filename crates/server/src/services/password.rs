//! Password hashing for provisioned admin users.
//!
//! The applicant's password is hashed when the signup is submitted and the
//! hash is carried over verbatim to the admin user on confirmation, so the
//! plaintext never reaches storage.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Password hashing failed.
#[derive(Debug, Error)]
#[error("password hashing failed")]
pub struct PasswordHashError;

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `PasswordHashError` if the hasher rejects the input.
pub fn hash_password(password: &str) -> Result<String, PasswordHashError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordHashError)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use argon2::{PasswordHash, PasswordVerifier};

    use super::*;

    #[test]
    fn test_hash_is_argon2id_and_verifies() {
        let hash = hash_password("12345678").unwrap();
        assert!(hash.starts_with("$argon2id$"));

        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(
            Argon2::default()
                .verify_password(b"12345678", &parsed)
                .is_ok()
        );
        assert!(
            Argon2::default()
                .verify_password(b"wrong-password", &parsed)
                .is_err()
        );
    }

    #[test]
    fn test_hash_is_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }
}
