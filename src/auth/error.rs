//! Typed failure taxonomy for account operations.
//!
//! Every domain failure carries a stable, caller-safe message. Unexpected
//! store or crypto failures are wrapped in `Internal`, logged server-side
//! and surfaced as a generic line so internal text never leaks.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("An account with this email already exists")]
    DuplicateEmail,
    /// Merged unknown-account / wrong-password: no enumeration signal.
    #[error("Invalid email or password")]
    InvalidCredentials,
    /// Merged wrong / expired reset token: indistinguishable to a prober.
    #[error("Invalid or expired reset token")]
    InvalidOrExpiredToken,
    #[error("No account found for this email")]
    AccountNotFound,
    #[error("Password must be at least 8 characters")]
    WeakPassword,
    #[error("Password cannot be all digits")]
    NumericPassword,
    #[error("Invalid value for field {0}")]
    InvalidFieldValue(&'static str),
    #[error("Failed to send reset email")]
    NotificationFailed,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::InvalidOrExpiredToken
            | Self::WeakPassword
            | Self::NumericPassword
            | Self::InvalidFieldValue(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::AccountNotFound => StatusCode::NOT_FOUND,
            Self::DuplicateEmail => StatusCode::CONFLICT,
            Self::NotificationFailed => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let Self::Internal(err) = &self {
            // Full chain goes to the log; the caller only sees the generic line.
            error!("internal error: {err:#}");
        }
        let body = Json(json!({ "message": self.to_string() }));
        (self.status(), body).into_response()
    }
}
