//! Password hashing and verification using Argon2id.

use anyhow::{Result, anyhow};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::warn;

/// Hash a password with Argon2id and a fresh random salt.
///
/// Returns a PHC-formatted string suitable for storage. A new salt is drawn
/// per call, so hashing the same password twice yields different outputs.
///
/// # Errors
///
/// Returns an error if the underlying hash computation fails.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!("failed to hash password: {err}"))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash.
///
/// Fails closed: a malformed stored hash is treated as a mismatch rather
/// than an error, so callers can only ever observe matched/not-matched.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        warn!("stored password hash is malformed, treating as mismatch");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn round_trip_matches() -> Result<()> {
        let hash = hash_password("longpass1")?;
        assert!(verify_password("longpass1", &hash));
        Ok(())
    }

    #[test]
    fn wrong_password_does_not_match() -> Result<()> {
        let hash = hash_password("longpass1")?;
        assert!(!verify_password("longpass2", &hash));
        Ok(())
    }

    #[test]
    fn hash_is_salted_per_call() -> Result<()> {
        let first = hash_password("longpass1")?;
        let second = hash_password("longpass1")?;
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
        Ok(())
    }

    #[test]
    fn plaintext_never_equals_hash() -> Result<()> {
        let hash = hash_password("longpass1")?;
        assert_ne!(hash, "longpass1");
        Ok(())
    }

    #[test]
    fn malformed_hash_fails_closed() {
        assert!(!verify_password("longpass1", "not-a-phc-string"));
        assert!(!verify_password("longpass1", ""));
    }
}
