//! Bearer-token authentication for protected endpoints.
//!
//! Missing header, bad signature, expired token and vanished account all
//! collapse into a bare `Unauthorized`: an outside caller only ever learns
//! that the request was not authorized.

use axum::http::{HeaderMap, header::AUTHORIZATION};
use sqlx::PgPool;
use tracing::debug;

use super::state::AccountState;
use super::storage::{AccountRecord, fetch_account};
use crate::auth::AuthError;

/// Resolve the `Authorization: Bearer` header into the caller's account.
pub(super) async fn require_account(
    headers: &HeaderMap,
    state: &AccountState,
    pool: &PgPool,
) -> Result<AccountRecord, AuthError> {
    let Some(token) = extract_bearer_token(headers) else {
        return Err(AuthError::Unauthorized);
    };

    let account_id = state.signer().verify(&token).map_err(|err| {
        debug!("token verification failed: {err}");
        AuthError::Unauthorized
    })?;

    match fetch_account(pool, account_id).await? {
        Some(account) => Ok(account),
        None => {
            debug!("valid token for missing account {account_id}");
            Err(AuthError::Unauthorized)
        }
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer_token(&headers), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn accepts_lowercase_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer token"));
        assert_eq!(extract_bearer_token(&headers), Some("token".to_string()));
    }

    #[test]
    fn rejects_missing_or_foreign_scheme() {
        let headers = HeaderMap::new();
        assert_eq!(extract_bearer_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(extract_bearer_token(&headers), None);
    }

    #[test]
    fn rejects_empty_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_bearer_token(&headers), None);
    }
}
