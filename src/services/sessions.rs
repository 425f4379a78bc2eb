//! Session management: issuing, verifying, and revoking per-device tokens.
//!
//! The token collection lives on the account row as a Postgres array, and
//! every mutation is a single `UPDATE` statement. Row-level atomicity of
//! `array_append`/`array_remove` means two concurrent revokes on the same
//! account cannot lose each other's update.

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::token::TokenSigner;
use crate::error::AppError;
use crate::models::Account;
use crate::services::credentials::ACCOUNT_COLUMNS;

/// Issues, verifies, and revokes session tokens bound to an account.
///
/// Holds the process-wide signing keys, injected once at construction.
pub struct SessionManager {
    signer: TokenSigner,
}

impl SessionManager {
    pub fn new(signer: TokenSigner) -> Self {
        Self { signer }
    }

    /// Signs a fresh token for the account, appends it to the account's
    /// token collection, and returns it. There is no cap on concurrent
    /// tokens; each device gets its own.
    pub async fn issue_token(&self, pool: &PgPool, account_id: Uuid) -> Result<String, AppError> {
        let token = self.signer.sign(account_id)?;

        let result = sqlx::query(
            "UPDATE accounts SET tokens = array_append(tokens, $1), updated_at = now() \
             WHERE id = $2",
        )
        .bind(&token)
        .bind(account_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Account not found".into()));
        }
        Ok(token)
    }

    /// Removes the matching token from the account's collection. Revoking
    /// a token that is already gone is a successful no-op.
    pub async fn revoke(&self, pool: &PgPool, account_id: Uuid, token: &str) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE accounts SET tokens = array_remove(tokens, $1), updated_at = now() \
             WHERE id = $2",
        )
        .bind(token)
        .bind(account_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Clears the entire token collection: "log out everywhere."
    pub async fn revoke_all(&self, pool: &PgPool, account_id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE accounts SET tokens = '{}', updated_at = now() WHERE id = $1")
            .bind(account_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// The core authentication check. A token authenticates if and only if
    /// its signature verifies, the encoded account still exists, and the
    /// literal token string is still in that account's collection. Every
    /// precondition failure collapses to the same generic error.
    pub async fn verify(&self, pool: &PgPool, token: &str) -> Result<(Account, String), AppError> {
        let claims = self.signer.decode(token)?;

        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1 AND $2 = ANY(tokens)"
        );
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(claims.sub)
            .bind(token)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Please authenticate".into()))?;

        Ok((account, token.to_string()))
    }
}
