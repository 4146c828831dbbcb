//! Authenticated password change.

use anyhow::{Context, anyhow};
use axum::{Json, extract::Extension, http::HeaderMap, http::StatusCode, response::IntoResponse};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info};

use super::principal::require_account;
use super::state::AccountState;
use super::storage::{lookup_credentials_by_id, update_password};
use super::types::{TokenResponse, UpdatePasswordRequest};
use super::utils::{all_digits, long_enough};
use crate::auth::{
    AuthError,
    password::{hash_password, verify_password},
};

#[utoipa::path(
    put,
    path = "/v1/account/password",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password replaced, new session token issued", body = TokenResponse),
        (status = 400, description = "New password too short or all digits"),
        (status = 401, description = "Missing session or wrong current password"),
    ),
    security(("bearer" = [])),
    tag = "account"
)]
pub async fn change_password(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    state: Extension<Arc<AccountState>>,
    payload: Option<Json<UpdatePasswordRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let account = require_account(&headers, &state, &pool).await?;

    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    if !long_enough(&request.new_password) {
        return Err(AuthError::WeakPassword);
    }
    if all_digits(&request.new_password) {
        return Err(AuthError::NumericPassword);
    }

    let credentials = lookup_credentials_by_id(&pool, account.id)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    let current = request.current_password;
    let stored = credentials.password_hash;
    let matched = tokio::task::spawn_blocking(move || verify_password(&current, &stored))
        .await
        .context("password verification task failed")?;
    if !matched {
        debug!(account_id = %account.id, "password change with wrong current password");
        return Err(AuthError::InvalidCredentials);
    }

    let new_password = request.new_password;
    let new_hash = tokio::task::spawn_blocking(move || hash_password(&new_password))
        .await
        .context("password hashing task failed")??;

    update_password(&pool, account.id, &new_hash).await?;

    // Existing sessions stay valid (no revocation); the caller gets a fresh
    // token to carry on with.
    let token = state
        .signer()
        .issue(account.id)
        .map_err(|err| AuthError::Internal(anyhow!(err)))?;

    info!(account_id = %account.id, "password changed");

    Ok((StatusCode::OK, Json(TokenResponse { token })))
}
