//! Login and (stateless) logout.

use anyhow::{Context, anyhow};
use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info};

use super::state::AccountState;
use super::storage::{lookup_credentials, touch_last_login};
use super::types::{AuthResponse, LoginRequest, MessageResponse, PublicAccount};
use super::utils::normalize_email;
use crate::auth::{AuthError, password::verify_password};

#[utoipa::path(
    post,
    path = "/v1/account/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session token issued", body = AuthResponse),
        (status = 401, description = "Invalid email or password"),
    ),
    tag = "account"
)]
pub async fn login(
    pool: Extension<PgPool>,
    state: Extension<Arc<AccountState>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    let email = normalize_email(&request.email);

    // Unknown email and wrong password take the same exit: one error kind,
    // one message, no enumeration signal.
    let Some(credentials) = lookup_credentials(&pool, &email).await? else {
        debug!("login for unknown email");
        return Err(AuthError::InvalidCredentials);
    };

    let password = request.password;
    let stored = credentials.password_hash;
    let matched = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .context("password verification task failed")?;
    if !matched {
        debug!("login with wrong password");
        return Err(AuthError::InvalidCredentials);
    }

    let account = touch_last_login(&pool, credentials.id)
        .await?
        .ok_or_else(|| AuthError::Internal(anyhow!("account vanished during login")))?;

    let token = state
        .signer()
        .issue(account.id)
        .map_err(|err| AuthError::Internal(anyhow!(err)))?;

    info!(account_id = %account.id, "login successful");

    let response = AuthResponse {
        token,
        account: PublicAccount::from(account),
    };
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/v1/account/logout",
    responses(
        (status = 200, description = "Logout acknowledged", body = MessageResponse),
    ),
    tag = "account"
)]
pub async fn logout() -> impl IntoResponse {
    // No revocation list: tokens stay valid for their full lifetime, the
    // client simply discards its copy.
    let response = MessageResponse {
        message: "Logged out".to_string(),
    };
    (StatusCode::OK, Json(response))
}
