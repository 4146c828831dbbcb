//! Password reset: request (emailed token) and completion.

use anyhow::{Context, anyhow};
use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info};

use super::state::AccountState;
use super::storage::{clear_reset_token, consume_reset_token, store_reset_token};
use super::types::{AuthResponse, ForgotPasswordRequest, MessageResponse, PublicAccount, ResetPasswordRequest};
use super::utils::{build_reset_url, long_enough, normalize_email, reset_email_body, valid_email};
use crate::auth::{
    AuthError,
    password::hash_password,
    reset::{generate_reset_token, hash_reset_token},
};

const RESET_EMAIL_SUBJECT: &str = "Password reset request";

#[utoipa::path(
    post,
    path = "/v1/account/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset email dispatched", body = MessageResponse),
        (status = 404, description = "No account found for this email"),
        (status = 502, description = "Reset email could not be delivered"),
    ),
    tag = "account"
)]
pub async fn forgot_password(
    pool: Extension<PgPool>,
    state: Extension<Arc<AccountState>>,
    payload: Option<Json<ForgotPasswordRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return Err(AuthError::Validation("Invalid email address".to_string()));
    }

    // The raw token exists only here and inside the emailed link; the store
    // keeps its sha256 plus a 10-minute expiry.
    let token = generate_reset_token()?;
    let token_hash = hash_reset_token(&token);

    let Some((account_id, account_email)) = store_reset_token(
        &pool,
        &email,
        &token_hash,
        state.config().reset_token_ttl_seconds(),
    )
    .await?
    else {
        return Err(AuthError::AccountNotFound);
    };

    let reset_url = build_reset_url(state.config().frontend_base_url(), &token);
    let body = reset_email_body(&reset_url);

    let mailer = state.mailer();
    let send_result =
        tokio::task::spawn_blocking(move || mailer.send(&account_email, RESET_EMAIL_SUBJECT, &body))
            .await
            .context("email dispatch task failed")?;

    if let Err(err) = send_result {
        error!("failed to send reset email: {err:#}");
        // Fail closed: no dangling valid token after a failed dispatch.
        clear_reset_token(&pool, account_id).await?;
        return Err(AuthError::NotificationFailed);
    }

    info!(account_id = %account_id, "password reset email dispatched");

    let response = MessageResponse {
        message: "Password reset email sent".to_string(),
    };
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    put,
    path = "/v1/account/reset-password/{token}",
    request_body = ResetPasswordRequest,
    params(
        ("token" = String, Path, description = "Reset token from the emailed link")
    ),
    responses(
        (status = 200, description = "Password replaced, fresh session token issued", body = AuthResponse),
        (status = 400, description = "Weak password or invalid/expired reset token"),
    ),
    tag = "account"
)]
pub async fn reset_password(
    pool: Extension<PgPool>,
    state: Extension<Arc<AccountState>>,
    Path(token): Path<String>,
    payload: Option<Json<ResetPasswordRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    if !long_enough(&request.password) {
        return Err(AuthError::WeakPassword);
    }

    let password = request.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("password hashing task failed")??;

    // Single atomic statement: match the hashed token inside its window,
    // install the new secret and clear the reset fields. No row means the
    // token was wrong, already consumed or expired; callers cannot tell
    // which, by design.
    let token_hash = hash_reset_token(&token);
    let Some(account) = consume_reset_token(&pool, &token_hash, &password_hash).await? else {
        return Err(AuthError::InvalidOrExpiredToken);
    };

    let session_token = state
        .signer()
        .issue(account.id)
        .map_err(|err| AuthError::Internal(anyhow!(err)))?;

    info!(account_id = %account.id, "password reset completed");

    let response = AuthResponse {
        token: session_token,
        account: PublicAccount::from(account),
    };
    Ok((StatusCode::OK, Json(response)))
}
