//! The owner-scoped task query engine.
//!
//! Ownership is part of every WHERE clause, never a check applied after
//! the fetch: a task that exists but belongs to someone else is
//! indistinguishable from one that does not exist.

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::task::TaskQueryOptions;
use crate::models::{Task, TaskInput, TaskQuery, TaskUpdate};
use crate::services::ensure_allowed_fields;

const TASK_COLUMNS: &str = "id, description, completed, owner_id, created_at, updated_at";

/// Fields a caller may change on one of their tasks.
pub const TASK_UPDATE_FIELDS: [&str; 2] = ["description", "completed"];

/// Creates a task owned by the given account. `completed` defaults to
/// false; the description is trimmed before storage.
pub async fn create(pool: &PgPool, owner_id: Uuid, input: &TaskInput) -> Result<Task, AppError> {
    input.validate()?;

    let sql = format!(
        "INSERT INTO tasks (id, description, completed, owner_id) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {TASK_COLUMNS}"
    );
    let task = sqlx::query_as::<_, Task>(&sql)
        .bind(Uuid::new_v4())
        .bind(input.description.trim())
        .bind(input.completed.unwrap_or(false))
        .bind(owner_id)
        .fetch_one(pool)
        .await?;

    Ok(task)
}

/// Resolves filter/sort/pagination parameters into a bounded, ordered
/// result set scoped to one owner. Without an explicit sort the result is
/// in creation order.
pub async fn query(pool: &PgPool, owner_id: Uuid, params: &TaskQuery) -> Result<Vec<Task>, AppError> {
    let options = params.normalize();
    let sql = build_list_sql(&options);

    let mut query_builder = sqlx::query_as::<_, Task>(&sql).bind(owner_id);
    if let Some(completed) = options.completed {
        query_builder = query_builder.bind(completed);
    }
    if let Some(limit) = options.limit {
        query_builder = query_builder.bind(limit);
    }
    if options.skip > 0 {
        query_builder = query_builder.bind(options.skip);
    }

    Ok(query_builder.fetch_all(pool).await?)
}

/// Builds the list statement. Sort columns come from the whitelist in
/// [`crate::models::task::TaskSortField`], so only bind positions vary
/// with user input.
fn build_list_sql(options: &TaskQueryOptions) -> String {
    let mut sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = $1");
    let mut param_count = 2;

    if options.completed.is_some() {
        sql.push_str(&format!(" AND completed = ${}", param_count));
        param_count += 1;
    }

    match options.sort {
        Some((field, direction)) => {
            sql.push_str(&format!(" ORDER BY {} {}", field.column(), direction.keyword()));
        }
        None => sql.push_str(" ORDER BY created_at ASC"),
    }

    if options.limit.is_some() {
        sql.push_str(&format!(" LIMIT ${}", param_count));
        param_count += 1;
    }
    if options.skip > 0 {
        sql.push_str(&format!(" OFFSET ${}", param_count));
    }

    sql
}

/// Fetches a single task if and only if it is owned by `owner_id`.
pub async fn get_owned(pool: &PgPool, owner_id: Uuid, task_id: Uuid) -> Result<Task, AppError> {
    let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND owner_id = $2");
    sqlx::query_as::<_, Task>(&sql)
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(task_not_found)
}

/// Applies a restricted partial update to an owned task. Disallowed field
/// names fail before any SQL runs.
pub async fn update_owned(
    pool: &PgPool,
    owner_id: Uuid,
    task_id: Uuid,
    body: &Value,
) -> Result<Task, AppError> {
    ensure_allowed_fields(body, &TASK_UPDATE_FIELDS)?;

    let update: TaskUpdate = serde_json::from_value(body.clone())
        .map_err(|e| AppError::BadRequest(format!("invalid updates: {}", e)))?;
    update.validate()?;

    // An empty body changes nothing; return the current record without
    // issuing a timestamp-only UPDATE.
    if update.is_empty() {
        return get_owned(pool, owner_id, task_id).await;
    }

    let description = update.description.as_deref().map(|v| v.trim().to_string());

    let mut sql = String::from("UPDATE tasks SET updated_at = now()");
    let mut param_count = 1;

    if description.is_some() {
        sql.push_str(&format!(", description = ${}", param_count));
        param_count += 1;
    }
    if update.completed.is_some() {
        sql.push_str(&format!(", completed = ${}", param_count));
        param_count += 1;
    }
    sql.push_str(&format!(
        " WHERE id = ${} AND owner_id = ${} RETURNING {}",
        param_count,
        param_count + 1,
        TASK_COLUMNS
    ));

    let mut query_builder = sqlx::query_as::<_, Task>(&sql);
    if let Some(description) = &description {
        query_builder = query_builder.bind(description);
    }
    if let Some(completed) = update.completed {
        query_builder = query_builder.bind(completed);
    }
    query_builder = query_builder.bind(task_id).bind(owner_id);

    query_builder
        .fetch_optional(pool)
        .await?
        .ok_or_else(task_not_found)
}

/// Deletes an owned task and returns it.
pub async fn delete_owned(pool: &PgPool, owner_id: Uuid, task_id: Uuid) -> Result<Task, AppError> {
    let sql = format!(
        "DELETE FROM tasks WHERE id = $1 AND owner_id = $2 RETURNING {TASK_COLUMNS}"
    );
    sqlx::query_as::<_, Task>(&sql)
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(task_not_found)
}

fn task_not_found() -> AppError {
    // "Does not exist" and "not yours" intentionally look the same.
    AppError::NotFound("Task not found".into())
}
