//! Signed session tokens: tamper-evident assertions of an account id.
//!
//! Tokens are HS256 JWTs over `{sub, iat, exp}` signed with a server-held
//! secret. There is no revocation list: a token stays valid for its full
//! lifetime once issued. Expiry is checked against an explicit clock so
//! tests can drive it deterministically.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Default session lifetime: 7 days from issuance.
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
    #[error("failed to sign token")]
    Signing,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies session tokens for account ids.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenSigner {
    #[must_use]
    pub fn new(secret: &SecretString, ttl_seconds: i64) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    /// Issue a token for `account_id`, valid for the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue(&self, account_id: Uuid) -> Result<String, TokenError> {
        self.issue_at(account_id, Utc::now())
    }

    /// Issue a token as of an explicit instant.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue_at(&self, account_id: Uuid, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            sub: account_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenError::Signing)
    }

    /// Verify a token and return the embedded account id.
    ///
    /// # Errors
    ///
    /// `Expired` when the current time is past the embedded expiry,
    /// `Invalid` for any tampered or malformed token. Callers at the HTTP
    /// edge collapse both into a bare 401.
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token against an explicit clock.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::verify`].
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, TokenError> {
        // Expiry is checked against the supplied clock below, not wall time.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims::<&str>(&[]);

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::Invalid)?;

        if now.timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Uuid::parse_str(&data.claims.sub).map_err(|_| TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn signer() -> TokenSigner {
        TokenSigner::new(&SecretString::from("test-secret"), DEFAULT_SESSION_TTL_SECONDS)
    }

    #[test]
    fn round_trip_returns_account_id() -> Result<(), TokenError> {
        let signer = signer();
        let id = Uuid::new_v4();
        let token = signer.issue(id)?;
        assert_eq!(signer.verify(&token)?, id);
        Ok(())
    }

    #[test]
    fn expired_after_lifetime() -> Result<(), TokenError> {
        let signer = signer();
        let issued = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().ok_or(TokenError::Invalid)?;
        let token = signer.issue_at(Uuid::new_v4(), issued)?;

        let just_before = issued + Duration::seconds(DEFAULT_SESSION_TTL_SECONDS - 1);
        assert!(signer.verify_at(&token, just_before).is_ok());

        let at_expiry = issued + Duration::seconds(DEFAULT_SESSION_TTL_SECONDS);
        assert_eq!(signer.verify_at(&token, at_expiry), Err(TokenError::Expired));
        Ok(())
    }

    #[test]
    fn tampered_token_is_invalid() -> Result<(), TokenError> {
        let signer = signer();
        let mut token = signer.issue(Uuid::new_v4())?;
        token.pop();
        token.push('A');
        assert_eq!(signer.verify(&token), Err(TokenError::Invalid));
        Ok(())
    }

    #[test]
    fn foreign_secret_is_invalid() -> Result<(), TokenError> {
        let token = signer().issue(Uuid::new_v4())?;
        let other = TokenSigner::new(&SecretString::from("other-secret"), DEFAULT_SESSION_TTL_SECONDS);
        assert_eq!(other.verify(&token), Err(TokenError::Invalid));
        Ok(())
    }

    #[test]
    fn garbage_is_invalid() {
        assert_eq!(signer().verify("not-a-token"), Err(TokenError::Invalid));
    }
}
