//! Account deletion cascade. No foreign key ties tasks to accounts, so
//! this is the only place that keeps the "no task outlives its owner"
//! invariant.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

/// Deletes every task owned by the account, then the account itself,
/// inside one transaction. Either both deletions commit or neither does;
/// a failure surfaces as a store error for the caller to act on, never a
/// silent partial state.
pub async fn delete_account(pool: &PgPool, account_id: Uuid) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM tasks WHERE owner_id = $1")
        .bind(account_id)
        .execute(&mut *tx)
        .await?;

    let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
        .bind(account_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(AppError::NotFound("Account not found".into()));
    }

    tx.commit().await?;
    Ok(())
}
