//! The credential store: owns the account entity, field validation, and
//! the one-way password transformation. Plaintext passwords exist only as
//! transient parameters in this module; everything persisted or returned
//! carries the bcrypt hash.

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::RegisterRequest;
use crate::error::AppError;
use crate::models::{Account, AccountUpdate};
use crate::services::ensure_allowed_fields;

pub const ACCOUNT_COLUMNS: &str =
    "id, name, email, password_hash, age, tokens, avatar, created_at, updated_at";

/// Fields a caller may change about their own account.
pub const ACCOUNT_UPDATE_FIELDS: [&str; 4] = ["name", "email", "password", "age"];

/// Registers a new account. The name is trimmed, the email lowercased,
/// the age defaulted to 0, and the password hashed before anything is
/// persisted.
pub async fn register(pool: &PgPool, payload: &RegisterRequest) -> Result<Account, AppError> {
    payload.validate()?;

    let name = payload.name.trim().to_string();
    let email = payload.email.trim().to_lowercase();

    let existing = sqlx::query("SELECT id FROM accounts WHERE email = $1")
        .bind(&email)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    let password_hash = hash_password(&payload.password)?;

    let sql = format!(
        "INSERT INTO accounts (id, name, email, password_hash, age) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {ACCOUNT_COLUMNS}"
    );
    // The unique index on email still backs the pre-check under races.
    let account = sqlx::query_as::<_, Account>(&sql)
        .bind(Uuid::new_v4())
        .bind(&name)
        .bind(&email)
        .bind(&password_hash)
        .bind(payload.age.unwrap_or(0))
        .fetch_one(pool)
        .await
        .map_err(map_unique_email)?;

    Ok(account)
}

/// Looks up an account by email and checks the password against the
/// stored hash. An unknown email and a wrong password produce the same
/// error, so callers cannot probe which addresses are registered.
pub async fn authenticate(pool: &PgPool, email: &str, password: &str) -> Result<Account, AppError> {
    let email = email.trim().to_lowercase();

    let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
    let account = sqlx::query_as::<_, Account>(&sql)
        .bind(&email)
        .fetch_optional(pool)
        .await?
        .ok_or_else(unable_to_login)?;

    if !verify_password(password, &account.password_hash)? {
        return Err(unable_to_login());
    }
    Ok(account)
}

/// Applies a restricted partial update to an account.
///
/// The raw payload is checked against [`ACCOUNT_UPDATE_FIELDS`] before any
/// deserialization, then re-validated with the same rules as registration.
/// If the password is among the updates it is hashed exactly once here,
/// no matter how many other fields change.
pub async fn update_fields(
    pool: &PgPool,
    account_id: Uuid,
    body: &Value,
) -> Result<Account, AppError> {
    ensure_allowed_fields(body, &ACCOUNT_UPDATE_FIELDS)?;

    let update: AccountUpdate = serde_json::from_value(body.clone())
        .map_err(|e| AppError::BadRequest(format!("invalid updates: {}", e)))?;
    update.validate()?;

    // An empty body changes nothing; return the current record without
    // issuing a timestamp-only UPDATE.
    if update.is_empty() {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        return Ok(sqlx::query_as::<_, Account>(&sql)
            .bind(account_id)
            .fetch_one(pool)
            .await?);
    }

    let name = update.name.as_deref().map(|v| v.trim().to_string());
    let email = update.email.as_deref().map(|v| v.trim().to_lowercase());
    let password_hash = match update.password.as_deref() {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    let mut sql = String::from("UPDATE accounts SET updated_at = now()");
    let mut param_count = 1;

    if name.is_some() {
        sql.push_str(&format!(", name = ${}", param_count));
        param_count += 1;
    }
    if email.is_some() {
        sql.push_str(&format!(", email = ${}", param_count));
        param_count += 1;
    }
    if password_hash.is_some() {
        sql.push_str(&format!(", password_hash = ${}", param_count));
        param_count += 1;
    }
    if update.age.is_some() {
        sql.push_str(&format!(", age = ${}", param_count));
        param_count += 1;
    }
    sql.push_str(&format!(" WHERE id = ${} RETURNING {}", param_count, ACCOUNT_COLUMNS));

    let mut query_builder = sqlx::query_as::<_, Account>(&sql);
    if let Some(name) = &name {
        query_builder = query_builder.bind(name);
    }
    if let Some(email) = &email {
        query_builder = query_builder.bind(email);
    }
    if let Some(password_hash) = &password_hash {
        query_builder = query_builder.bind(password_hash);
    }
    if let Some(age) = update.age {
        query_builder = query_builder.bind(age);
    }
    query_builder = query_builder.bind(account_id);

    let account = query_builder
        .fetch_one(pool)
        .await
        .map_err(map_unique_email)?;

    Ok(account)
}

fn unable_to_login() -> AppError {
    AppError::Unauthorized("Unable to Login".into())
}

fn map_unique_email(error: sqlx::Error) -> AppError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::BadRequest("Email already registered".into())
        }
        _ => error.into(),
    }
}
