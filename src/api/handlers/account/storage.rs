//! Database helpers for account, credential and reset-token state.
//!
//! The store is the only shared resource; single-statement read-modify-write
//! operations (notably reset-token consumption) carry the atomicity the
//! credential flows rely on.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use tracing::Instrument;
use uuid::Uuid;

use super::types::Address;
use super::utils::is_unique_violation;

const ACCOUNT_COLUMNS: &str = "id, email, name, role, work_area, identity_type, identity_id, \
     birthday, phone, mobile, address, last_login_at, created_at, updated_at";

/// Full account row minus secret-bearing columns.
#[derive(Debug)]
pub(crate) struct AccountRecord {
    pub(crate) id: Uuid,
    pub(crate) email: String,
    pub(crate) name: String,
    pub(crate) role: String,
    pub(crate) work_area: String,
    pub(crate) identity_type: String,
    pub(crate) identity_id: Option<String>,
    pub(crate) birthday: Option<NaiveDate>,
    pub(crate) phone: Option<String>,
    pub(crate) mobile: Option<String>,
    pub(crate) address: Option<Address>,
    pub(crate) last_login_at: Option<DateTime<Utc>>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// Minimal fields needed to check a password.
#[derive(Debug)]
pub(super) struct CredentialRecord {
    pub(super) id: Uuid,
    pub(super) password_hash: String,
}

/// Outcome when attempting to create a new account.
#[derive(Debug)]
pub(super) enum InsertOutcome {
    Created(AccountRecord),
    Conflict,
}

/// Allow-listed profile changes; `None` leaves the column untouched.
#[derive(Debug, Default)]
pub(super) struct ProfileChanges {
    pub(super) name: Option<String>,
    pub(super) role: Option<String>,
    pub(super) work_area: Option<String>,
    pub(super) identity_id: Option<String>,
    pub(super) birthday: Option<NaiveDate>,
    pub(super) phone: Option<String>,
    pub(super) mobile: Option<String>,
    pub(super) address: Option<Address>,
    pub(super) identity_type: Option<String>,
}

fn row_to_account(row: &PgRow) -> AccountRecord {
    let address: Option<Json<Address>> = row.get("address");
    AccountRecord {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        role: row.get("role"),
        work_area: row.get("work_area"),
        identity_type: row.get("identity_type"),
        identity_id: row.get("identity_id"),
        birthday: row.get("birthday"),
        phone: row.get("phone"),
        mobile: row.get("mobile"),
        address: address.map(|json| json.0),
        last_login_at: row.get("last_login_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Look up the password hash by normalized email (login path).
pub(super) async fn lookup_credentials(
    pool: &PgPool,
    email: &str,
) -> Result<Option<CredentialRecord>> {
    let query = "SELECT id, password_hash FROM accounts WHERE email = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup credentials")?;

    Ok(row.map(|row| CredentialRecord {
        id: row.get("id"),
        password_hash: row.get("password_hash"),
    }))
}

/// Look up the password hash by account id (password-change path).
pub(super) async fn lookup_credentials_by_id(
    pool: &PgPool,
    account_id: Uuid,
) -> Result<Option<CredentialRecord>> {
    let query = "SELECT id, password_hash FROM accounts WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(account_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup credentials by id")?;

    Ok(row.map(|row| CredentialRecord {
        id: row.get("id"),
        password_hash: row.get("password_hash"),
    }))
}

pub(super) async fn fetch_account(pool: &PgPool, account_id: Uuid) -> Result<Option<AccountRecord>> {
    let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(account_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to fetch account")?;

    Ok(row.map(|row| row_to_account(&row)))
}

/// Insert a new account; the unique index on email decides conflicts, so a
/// racing duplicate registration still ends up as `Conflict`.
pub(super) async fn insert_account(
    pool: &PgPool,
    email: &str,
    name: &str,
    password_hash: &str,
) -> Result<InsertOutcome> {
    let query = format!(
        "INSERT INTO accounts (email, name, password_hash) VALUES ($1, $2, $3) \
         RETURNING {ACCOUNT_COLUMNS}"
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match row {
        Ok(row) => Ok(InsertOutcome::Created(row_to_account(&row))),
        Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::Conflict),
        Err(err) => Err(err).context("failed to insert account"),
    }
}

/// Record a successful login and return the refreshed account row.
pub(super) async fn touch_last_login(
    pool: &PgPool,
    account_id: Uuid,
) -> Result<Option<AccountRecord>> {
    let query = format!(
        "UPDATE accounts SET last_login_at = NOW(), updated_at = NOW() \
         WHERE id = $1 RETURNING {ACCOUNT_COLUMNS}"
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(account_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to record login time")?;

    Ok(row.map(|row| row_to_account(&row)))
}

/// Attach a hashed reset token and its expiry to the account with this email.
/// Returns the account id and email, or `None` when the email is unknown.
/// Overwriting any previous token keeps at most one outstanding reset.
pub(super) async fn store_reset_token(
    pool: &PgPool,
    email: &str,
    token_hash: &[u8],
    ttl_seconds: i64,
) -> Result<Option<(Uuid, String)>> {
    let query = "UPDATE accounts \
         SET reset_token_hash = $2, \
             reset_token_expires_at = NOW() + ($3 * INTERVAL '1 second'), \
             updated_at = NOW() \
         WHERE email = $1 \
         RETURNING id, email";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .bind(token_hash)
        .bind(ttl_seconds)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to store reset token")?;

    Ok(row.map(|row| (row.get("id"), row.get("email"))))
}

/// Roll back a reset token after a failed notification dispatch, so no
/// dangling valid token survives a reset-initiation that the user never saw.
pub(super) async fn clear_reset_token(pool: &PgPool, account_id: Uuid) -> Result<()> {
    let query = "UPDATE accounts \
         SET reset_token_hash = NULL, reset_token_expires_at = NULL, updated_at = NOW() \
         WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(account_id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to clear reset token")?;
    Ok(())
}

/// Atomically consume a reset token: match the hash with an unexpired
/// window, install the new password hash and clear both reset fields in one
/// statement. Two racing completions cannot both match; the loser sees no
/// row, which callers report as invalid-or-expired. Wrong, unknown and
/// expired tokens are indistinguishable here by design.
pub(super) async fn consume_reset_token(
    pool: &PgPool,
    token_hash: &[u8],
    new_password_hash: &str,
) -> Result<Option<AccountRecord>> {
    let query = format!(
        "UPDATE accounts \
         SET password_hash = $2, \
             reset_token_hash = NULL, \
             reset_token_expires_at = NULL, \
             updated_at = NOW() \
         WHERE reset_token_hash = $1 \
           AND reset_token_expires_at > NOW() \
         RETURNING {ACCOUNT_COLUMNS}"
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(token_hash)
        .bind(new_password_hash)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to consume reset token")?;

    Ok(row.map(|row| row_to_account(&row)))
}

/// Replace the password hash (authenticated password change). Clears any
/// outstanding reset token: a fresh password supersedes a pending reset.
pub(super) async fn update_password(
    pool: &PgPool,
    account_id: Uuid,
    new_password_hash: &str,
) -> Result<()> {
    let query = "UPDATE accounts \
         SET password_hash = $2, \
             reset_token_hash = NULL, \
             reset_token_expires_at = NULL, \
             updated_at = NOW() \
         WHERE id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(account_id)
        .bind(new_password_hash)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to update password")?;
    Ok(())
}

/// Apply allow-listed profile changes; absent fields keep their value.
/// Email is deliberately not touchable through this statement.
pub(super) async fn update_profile(
    pool: &PgPool,
    account_id: Uuid,
    changes: ProfileChanges,
) -> Result<Option<AccountRecord>> {
    let query = format!(
        "UPDATE accounts SET \
             name = COALESCE($2, name), \
             role = COALESCE($3, role), \
             work_area = COALESCE($4, work_area), \
             identity_id = COALESCE($5, identity_id), \
             birthday = COALESCE($6, birthday), \
             phone = COALESCE($7, phone), \
             mobile = COALESCE($8, mobile), \
             address = COALESCE($9, address), \
             identity_type = COALESCE($10, identity_type), \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {ACCOUNT_COLUMNS}"
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(account_id)
        .bind(changes.name)
        .bind(changes.role)
        .bind(changes.work_area)
        .bind(changes.identity_id)
        .bind(changes.birthday)
        .bind(changes.phone)
        .bind(changes.mobile)
        .bind(changes.address.map(Json))
        .bind(changes.identity_type)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to update profile")?;

    Ok(row.map(|row| row_to_account(&row)))
}
