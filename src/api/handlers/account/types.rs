//! Request/response types for account endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::storage::AccountRecord;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResetPasswordRequest {
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Allow-listed profile updates. Unknown fields are rejected outright so a
/// caller cannot smuggle email or credential changes through this path.
#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub role: Option<String>,
    pub work_area: Option<String>,
    pub identity_id: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub address: Option<Address>,
    pub identity_type: Option<String>,
}

/// Postal address subfields, stored as a single JSONB column.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Address {
    pub city: Option<String>,
    pub district: Option<String>,
    pub village: Option<String>,
    pub neighborhood: Option<String>,
    pub street: Option<String>,
    pub section: Option<String>,
    pub lane: Option<String>,
    pub alley: Option<String>,
    pub number: Option<String>,
    pub floor: Option<String>,
}

/// Caller-facing view of an account.
///
/// Carries no secret-bearing fields by construction: the password hash and
/// the reset-token pair simply do not exist on this type.
#[derive(ToSchema, Serialize, Debug)]
pub struct PublicAccount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub work_area: String,
    pub identity_type: String,
    pub identity_id: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub address: Option<Address>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AccountRecord> for PublicAccount {
    fn from(record: AccountRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            role: record.role,
            work_area: record.work_area,
            identity_type: record.identity_type,
            identity_id: record.identity_id,
            birthday: record.birthday,
            phone: record.phone,
            mobile: record.mobile,
            address: record.address,
            last_login_at: record.last_login_at,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Session token plus the public account view, returned by register, login
/// and reset completion.
#[derive(ToSchema, Serialize, Debug)]
pub struct AuthResponse {
    pub token: String,
    pub account: PublicAccount,
}

/// Bare session token, returned by password change.
#[derive(ToSchema, Serialize, Debug)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}
