//! Single-use, time-boxed password-reset tokens.
//!
//! The raw token is only ever returned to the caller for the emailed reset
//! link; the database stores its sha256 digest together with an expiry ten
//! minutes out. Matching treats an expired token exactly like an unknown
//! one, so a probing caller cannot tell the two apart. Consumption (clearing
//! the fields) happens when a new password is committed, never on lookup.

use anyhow::{Context, Result};
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

/// Reset tokens expire 10 minutes after issuance.
pub const RESET_TOKEN_TTL_SECONDS: i64 = 10 * 60;

/// Generate a fresh reset token: 32 random bytes, base64url without padding.
///
/// # Errors
///
/// Returns an error if the OS random source fails.
pub fn generate_reset_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate reset token")?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

/// Hash a reset token so the raw value never touches the database.
#[must_use]
pub fn hash_reset_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

/// Matching predicate for a stored reset token.
///
/// True only when the candidate hashes to the stored digest and the expiry
/// is strictly in the future. The SQL completion path enforces the same
/// predicate (`reset_token_hash = $1 AND reset_token_expires_at > NOW()`);
/// this form exists so expiry can be exercised with a simulated clock.
#[must_use]
pub fn reset_token_matches(
    stored_hash: &[u8],
    expires_at: DateTime<Utc>,
    candidate: &str,
    now: DateTime<Utc>,
) -> bool {
    expires_at > now && hash_reset_token(candidate) == stored_hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use chrono::Duration;

    #[test]
    fn generated_token_has_full_entropy() -> Result<()> {
        let token = generate_reset_token()?;
        let decoded = URL_SAFE_NO_PAD.decode(token.as_bytes())?;
        assert_eq!(decoded.len(), 32);
        Ok(())
    }

    #[test]
    fn generated_tokens_are_unique() -> Result<()> {
        assert_ne!(generate_reset_token()?, generate_reset_token()?);
        Ok(())
    }

    #[test]
    fn hash_is_stable_and_discriminating() {
        assert_eq!(hash_reset_token("token"), hash_reset_token("token"));
        assert_ne!(hash_reset_token("token"), hash_reset_token("other"));
        assert_eq!(hash_reset_token("token").len(), 32);
    }

    #[test]
    fn matches_inside_window() -> Result<()> {
        let token = generate_reset_token()?;
        let stored = hash_reset_token(&token);
        let now = Utc::now();
        let expires = now + Duration::seconds(RESET_TOKEN_TTL_SECONDS);
        assert!(reset_token_matches(&stored, expires, &token, now));
        Ok(())
    }

    #[test]
    fn wrong_token_does_not_match() -> Result<()> {
        let stored = hash_reset_token(&generate_reset_token()?);
        let now = Utc::now();
        let expires = now + Duration::seconds(RESET_TOKEN_TTL_SECONDS);
        assert!(!reset_token_matches(&stored, expires, "wrong-token", now));
        Ok(())
    }

    #[test]
    fn expired_token_is_treated_as_absent() -> Result<()> {
        let token = generate_reset_token()?;
        let stored = hash_reset_token(&token);
        let issued = Utc::now();
        let expires = issued + Duration::seconds(RESET_TOKEN_TTL_SECONDS);

        // Exactly at expiry the window is closed: the check is strict.
        assert!(!reset_token_matches(&stored, expires, &token, expires));

        let after = expires + Duration::seconds(1);
        assert!(!reset_token_matches(&stored, expires, &token, after));
        Ok(())
    }
}
