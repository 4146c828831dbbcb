//! Authenticated self-service endpoints: current profile and allow-listed
//! profile updates. Email is immutable through this path.

use axum::{Json, extract::Extension, http::HeaderMap, http::StatusCode, response::IntoResponse};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

use super::principal::require_account;
use super::state::AccountState;
use super::storage::{ProfileChanges, update_profile};
use super::types::{ProfileUpdateRequest, PublicAccount};
use super::utils::{valid_identity_type, valid_role, valid_work_area};
use crate::auth::AuthError;

#[utoipa::path(
    get,
    path = "/v1/account/me",
    responses(
        (status = 200, description = "The authenticated account", body = PublicAccount),
        (status = 401, description = "Missing or invalid session token"),
    ),
    security(("bearer" = [])),
    tag = "account"
)]
pub async fn me(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    state: Extension<Arc<AccountState>>,
) -> Result<impl IntoResponse, AuthError> {
    let account = require_account(&headers, &state, &pool).await?;
    Ok((StatusCode::OK, Json(PublicAccount::from(account))))
}

#[utoipa::path(
    put,
    path = "/v1/account/profile",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated", body = PublicAccount),
        (status = 400, description = "Unknown field or out-of-enum value"),
        (status = 401, description = "Missing or invalid session token"),
    ),
    security(("bearer" = [])),
    tag = "account"
)]
pub async fn update(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    state: Extension<Arc<AccountState>>,
    payload: Option<Json<ProfileUpdateRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let account = require_account(&headers, &state, &pool).await?;

    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    // Everything is validated before any write: an out-of-enum value
    // rejects the whole request with nothing persisted.
    let changes = validate_changes(request)?;

    let Some(updated) = update_profile(&pool, account.id, changes).await? else {
        return Err(AuthError::AccountNotFound);
    };

    info!(account_id = %updated.id, "profile updated");

    Ok((StatusCode::OK, Json(PublicAccount::from(updated))))
}

fn validate_changes(request: ProfileUpdateRequest) -> Result<ProfileChanges, AuthError> {
    let name = match request.name {
        Some(name) => {
            let trimmed = name.trim().to_string();
            if trimmed.is_empty() {
                return Err(AuthError::Validation("Name cannot be empty".to_string()));
            }
            Some(trimmed)
        }
        None => None,
    };

    if let Some(role) = request.role.as_deref() {
        if !valid_role(role) {
            return Err(AuthError::InvalidFieldValue("role"));
        }
    }
    if let Some(work_area) = request.work_area.as_deref() {
        if !valid_work_area(work_area) {
            return Err(AuthError::InvalidFieldValue("work_area"));
        }
    }
    if let Some(identity_type) = request.identity_type.as_deref() {
        if !valid_identity_type(identity_type) {
            return Err(AuthError::InvalidFieldValue("identity_type"));
        }
    }

    Ok(ProfileChanges {
        name,
        role: request.role,
        work_area: request.work_area,
        identity_id: request.identity_id,
        birthday: request.birthday,
        phone: request.phone,
        mobile: request.mobile,
        address: request.address,
        identity_type: request.identity_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::account::types::Address;

    #[test]
    fn rejects_invalid_work_area() {
        let request = ProfileUpdateRequest {
            work_area: Some("invalid-zone".to_string()),
            ..ProfileUpdateRequest::default()
        };
        let err = validate_changes(request).expect_err("must reject");
        assert_eq!(err.to_string(), "Invalid value for field work_area");
    }

    #[test]
    fn rejects_invalid_role_and_identity_type() {
        let request = ProfileUpdateRequest {
            role: Some("root".to_string()),
            ..ProfileUpdateRequest::default()
        };
        assert!(validate_changes(request).is_err());

        let request = ProfileUpdateRequest {
            identity_type: Some("secret".to_string()),
            ..ProfileUpdateRequest::default()
        };
        assert!(validate_changes(request).is_err());
    }

    #[test]
    fn rejects_blank_name() {
        let request = ProfileUpdateRequest {
            name: Some("   ".to_string()),
            ..ProfileUpdateRequest::default()
        };
        assert!(validate_changes(request).is_err());
    }

    #[test]
    fn passes_valid_changes_through() {
        let request = ProfileUpdateRequest {
            name: Some("  Alice  ".to_string()),
            work_area: Some("north".to_string()),
            address: Some(Address {
                city: Some("Taipei".to_string()),
                ..Address::default()
            }),
            ..ProfileUpdateRequest::default()
        };
        let changes = validate_changes(request).expect("must accept");
        assert_eq!(changes.name.as_deref(), Some("Alice"));
        assert_eq!(changes.work_area.as_deref(), Some("north"));
        assert!(changes.address.is_some());
        assert!(changes.role.is_none());
    }

    #[test]
    fn absent_fields_stay_untouched() {
        let changes = validate_changes(ProfileUpdateRequest::default()).expect("must accept");
        assert!(changes.name.is_none());
        assert!(changes.birthday.is_none());
        assert!(changes.address.is_none());
    }
}
