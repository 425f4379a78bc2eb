//! Owner-scoped task query integration tests.
//!
//! These run against a real Postgres with migrations applied; set
//! DATABASE_URL and run with `cargo test -- --ignored`.

use actix_web::{test, web, App};
use dotenv::dotenv;
use serde_json::json;
use sqlx::PgPool;

use tasknest::auth::{AuthMiddleware, AuthResponse, TokenSigner};
use tasknest::models::Task;
use tasknest::routes;
use tasknest::services::SessionManager;

const TEST_JWT_SECRET: &str = "tasknest-integration-secret";

async fn connect() -> PgPool {
    dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB")
}

async fn cleanup_account(pool: &PgPool, email: &str) {
    let _ = sqlx::query(
        "DELETE FROM tasks WHERE owner_id IN (SELECT id FROM accounts WHERE email = $1)",
    )
    .bind(email)
    .execute(pool)
    .await;
    let _ = sqlx::query("DELETE FROM accounts WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await;
}

macro_rules! test_app {
    ($pool:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .app_data(web::Data::new(SessionManager::new(TokenSigner::new(
                    TEST_JWT_SECRET,
                ))))
                .service(routes::health::health)
                .service(
                    web::scope("/api")
                        .wrap(AuthMiddleware)
                        .configure(routes::config),
                ),
        )
        .await
    };
}

async fn register(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    name: &str,
    email: &str,
) -> AuthResponse {
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "name": name, "email": email, "password": "secret123" }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    assert_eq!(
        status,
        201,
        "registration failed: {}",
        String::from_utf8_lossy(&body)
    );
    serde_json::from_slice(&body).expect("Failed to parse registration response")
}

async fn create_task(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    token: &str,
    description: &str,
    completed: bool,
) -> Task {
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .set_json(json!({ "description": description, "completed": completed }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201);
    test::read_body_json(resp).await
}

#[ignore]
#[actix_rt::test]
async fn test_tasks_are_owner_scoped() {
    let pool = connect().await;
    cleanup_account(&pool, "scoped-alice@example.com").await;
    cleanup_account(&pool, "scoped-bob@example.com").await;
    let app = test_app!(pool);

    let alice = register(&app, "Alice", "scoped-alice@example.com").await;
    let bob = register(&app, "Bob", "scoped-bob@example.com").await;

    let alice_task = create_task(&app, &alice.token, "buy milk", false).await;
    create_task(&app, &bob.token, "walk the dog", false).await;

    // Each caller only ever sees their own tasks.
    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .insert_header(("Authorization", format!("Bearer {}", alice.token)))
        .to_request();
    let tasks: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].description, "buy milk");
    assert_eq!(tasks[0].owner_id, alice.account.id);

    // A guessed identifier owned by someone else behaves exactly like a
    // missing record, for read, update, and delete alike.
    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", alice_task.id))
        .insert_header(("Authorization", format!("Bearer {}", bob.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/tasks/{}", alice_task.id))
        .insert_header(("Authorization", format!("Bearer {}", bob.token)))
        .set_json(json!({ "completed": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", alice_task.id))
        .insert_header(("Authorization", format!("Bearer {}", bob.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    // The owner still sees the task unmodified.
    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", alice_task.id))
        .insert_header(("Authorization", format!("Bearer {}", alice.token)))
        .to_request();
    let task: Task = test::call_and_read_body_json(&app, req).await;
    assert!(!task.completed);

    cleanup_account(&pool, "scoped-alice@example.com").await;
    cleanup_account(&pool, "scoped-bob@example.com").await;
}

#[ignore]
#[actix_rt::test]
async fn test_list_filter_sort_paginate() {
    let pool = connect().await;
    cleanup_account(&pool, "lists@example.com").await;
    let app = test_app!(pool);

    let authed = register(&app, "Lister", "lists@example.com").await;
    let bearer = format!("Bearer {}", authed.token);

    create_task(&app, &authed.token, "alpha", false).await;
    create_task(&app, &authed.token, "bravo", true).await;
    create_task(&app, &authed.token, "charlie", true).await;

    // Default order is creation order.
    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .insert_header(("Authorization", bearer.clone()))
        .to_request();
    let tasks: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    let descriptions: Vec<&str> = tasks.iter().map(|t| t.description.as_str()).collect();
    assert_eq!(descriptions, ["alpha", "bravo", "charlie"]);

    // Completion filter.
    let req = test::TestRequest::get()
        .uri("/api/tasks?completed=false")
        .insert_header(("Authorization", bearer.clone()))
        .to_request();
    let tasks: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].description, "alpha");

    // Explicit sort.
    let req = test::TestRequest::get()
        .uri("/api/tasks?sortBy=description:desc")
        .insert_header(("Authorization", bearer.clone()))
        .to_request();
    let tasks: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    let descriptions: Vec<&str> = tasks.iter().map(|t| t.description.as_str()).collect();
    assert_eq!(descriptions, ["charlie", "bravo", "alpha"]);

    // Offset pagination.
    let req = test::TestRequest::get()
        .uri("/api/tasks?limit=1&skip=1")
        .insert_header(("Authorization", bearer.clone()))
        .to_request();
    let tasks: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].description, "bravo");

    // Malformed pagination and filter values are ignored, not faulted.
    let req = test::TestRequest::get()
        .uri("/api/tasks?limit=ten&skip=-2&completed=banana")
        .insert_header(("Authorization", bearer))
        .to_request();
    let tasks: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tasks.len(), 3);

    cleanup_account(&pool, "lists@example.com").await;
}

#[ignore]
#[actix_rt::test]
async fn test_update_task_restricted_fields() {
    let pool = connect().await;
    cleanup_account(&pool, "task-updates@example.com").await;
    let app = test_app!(pool);

    let authed = register(&app, "Updater", "task-updates@example.com").await;
    let bearer = format!("Bearer {}", authed.token);
    let task = create_task(&app, &authed.token, "draft report", false).await;

    // A field outside {description, completed} fails before any mutation.
    let req = test::TestRequest::patch()
        .uri(&format!("/api/tasks/{}", task.id))
        .insert_header(("Authorization", bearer.clone()))
        .set_json(json!({ "completed": true, "owner_id": authed.account.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 422);

    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", task.id))
        .insert_header(("Authorization", bearer.clone()))
        .to_request();
    let unchanged: Task = test::call_and_read_body_json(&app, req).await;
    assert!(!unchanged.completed);
    assert_eq!(unchanged.description, "draft report");

    // An empty body is a no-op: same record back, timestamp untouched.
    let req = test::TestRequest::patch()
        .uri(&format!("/api/tasks/{}", task.id))
        .insert_header(("Authorization", bearer.clone()))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let untouched: Task = test::read_body_json(resp).await;
    assert_eq!(untouched.description, "draft report");
    assert_eq!(untouched.updated_at, task.updated_at);

    // A blank description is rejected.
    let req = test::TestRequest::patch()
        .uri(&format!("/api/tasks/{}", task.id))
        .insert_header(("Authorization", bearer.clone()))
        .set_json(json!({ "description": "   " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 422);

    // A valid update applies and returns the record.
    let req = test::TestRequest::patch()
        .uri(&format!("/api/tasks/{}", task.id))
        .insert_header(("Authorization", bearer.clone()))
        .set_json(json!({ "description": "file report", "completed": true }))
        .to_request();
    let updated: Task = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated.description, "file report");
    assert!(updated.completed);

    // Delete responds with the deleted record.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/tasks/{}", task.id))
        .insert_header(("Authorization", bearer.clone()))
        .to_request();
    let deleted: Task = test::call_and_read_body_json(&app, req).await;
    assert_eq!(deleted.id, task.id);

    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{}", task.id))
        .insert_header(("Authorization", bearer))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    cleanup_account(&pool, "task-updates@example.com").await;
}

#[ignore]
#[actix_rt::test]
async fn test_tasks_require_authentication() {
    let pool = connect().await;
    let app = test_app!(pool);

    // Missing token.
    let req = test::TestRequest::get().uri("/api/tasks").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    // Garbage token.
    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .insert_header(("Authorization", "Bearer not.a.token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    // A structurally valid token signed with another secret.
    let forged = TokenSigner::new("some-other-secret")
        .sign(uuid::Uuid::new_v4())
        .unwrap();
    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .insert_header(("Authorization", format!("Bearer {}", forged)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}
