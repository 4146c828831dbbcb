//! Account registration.

use anyhow::{Context, anyhow};
use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use super::state::AccountState;
use super::storage::{InsertOutcome, insert_account};
use super::types::{AuthResponse, PublicAccount, RegisterRequest};
use super::utils::{long_enough, normalize_email, valid_email};
use crate::auth::{AuthError, password::hash_password};

#[utoipa::path(
    post,
    path = "/v1/account/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, session token issued", body = AuthResponse),
        (status = 400, description = "Malformed name, email or password"),
        (status = 409, description = "An account with this email already exists"),
    ),
    tag = "account"
)]
pub async fn register(
    pool: Extension<PgPool>,
    state: Extension<Arc<AccountState>>,
    payload: Option<Json<RegisterRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(AuthError::Validation("Name is required".to_string()));
    }

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return Err(AuthError::Validation("Invalid email address".to_string()));
    }

    if !long_enough(&request.password) {
        return Err(AuthError::WeakPassword);
    }

    // Argon2 is CPU-bound; keep it off the async executor.
    let password = request.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("password hashing task failed")??;

    let account = match insert_account(&pool, &email, &name, &password_hash).await? {
        InsertOutcome::Created(account) => account,
        InsertOutcome::Conflict => return Err(AuthError::DuplicateEmail),
    };

    let token = state
        .signer()
        .issue(account.id)
        .map_err(|err| AuthError::Internal(anyhow!(err)))?;

    info!(account_id = %account.id, "account registered");

    let response = AuthResponse {
        token,
        account: PublicAccount::from(account),
    };
    Ok((StatusCode::CREATED, Json(response)))
}
