//! Argon2id password hashing and the account password policy.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password hashing failed")]
    HashingFailed,
    #[error("password does not match")]
    Mismatch,
    #[error("stored password hash is malformed")]
    InvalidHashFormat,
}

/// Hash a password into a PHC string with a random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::HashingFailed)
}

/// Verify `password` against a stored PHC hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| PasswordError::Mismatch)
}

/// Check the password policy, returning every rule the password breaks.
///
/// Requires a minimum length plus at least one digit, one lowercase letter,
/// one uppercase letter and one symbol.
pub fn check_password_policy(password: &str) -> Result<(), Vec<&'static str>> {
    let mut violations = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LEN {
        violations.push("must be at least 6 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push("must contain a digit");
    }
    if !password.chars().any(char::is_lowercase) {
        violations.push("must contain a lowercase letter");
    }
    if !password.chars().any(char::is_uppercase) {
        violations.push("must contain an uppercase letter");
    }
    if password.chars().all(char::is_alphanumeric) {
        violations.push("must contain a non-alphanumeric character");
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}
