use crate::{
    auth::AuthedAccount,
    error::AppError,
    models::{TaskInput, TaskQuery},
    services::task_query,
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;

/// List the caller's tasks
///
/// ## Query Parameters:
/// - `completed` (optional): `true` or `false`; anything else is ignored.
/// - `sortBy` (optional): `field:direction`, e.g. `createdAt:desc`.
///   Sortable fields: `description`, `completed`, `createdAt`, `updatedAt`.
/// - `limit` / `skip` (optional): offset pagination; non-numeric or
///   negative values are ignored rather than rejected.
///
/// Results only ever contain tasks owned by the authenticated account.
#[get("")]
pub async fn list_tasks(
    pool: web::Data<PgPool>,
    params: web::Query<TaskQuery>,
    authed: AuthedAccount,
) -> Result<impl Responder, AppError> {
    let tasks = task_query::query(&pool, authed.account.id, &params).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Create a task owned by the caller
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    payload: web::Json<TaskInput>,
    authed: AuthedAccount,
) -> Result<impl Responder, AppError> {
    let task = task_query::create(&pool, authed.account.id, &payload).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Fetch one of the caller's tasks
///
/// A task that exists but belongs to another account answers 404, exactly
/// like a task that does not exist.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    authed: AuthedAccount,
) -> Result<impl Responder, AppError> {
    let task = task_query::get_owned(&pool, authed.account.id, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Update one of the caller's tasks
///
/// Only {description, completed} may appear in the body; anything else
/// fails before any mutation is applied.
#[patch("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    body: web::Json<serde_json::Value>,
    authed: AuthedAccount,
) -> Result<impl Responder, AppError> {
    let task =
        task_query::update_owned(&pool, authed.account.id, task_id.into_inner(), &body).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Delete one of the caller's tasks, responding with the deleted record
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    task_id: web::Path<Uuid>,
    authed: AuthedAccount,
) -> Result<impl Responder, AppError> {
    let task = task_query::delete_owned(&pool, authed.account.id, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}
