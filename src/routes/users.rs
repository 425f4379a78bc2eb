use crate::{
    auth::{AuthResponse, AuthedAccount, LoginRequest, RegisterRequest},
    error::AppError,
    models::PublicAccount,
    services::{cascade, credentials, SessionManager},
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// Register a new account
///
/// Creates the account and immediately issues a first session token.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    sessions: web::Data<SessionManager>,
    payload: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    let account = credentials::register(&pool, &payload).await?;
    let token = sessions.issue_token(&pool, account.id).await?;

    log::info!("account {} registered", account.id);

    Ok(HttpResponse::Created().json(AuthResponse {
        account: PublicAccount::from(&account),
        token,
    }))
}

/// Login
///
/// Authenticates by email and password and issues a new per-device token.
/// Wrong password and unknown email answer identically.
#[post("/login")]
pub async fn login(
    pool: web::Data<PgPool>,
    sessions: web::Data<SessionManager>,
    payload: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    payload.validate().map_err(|_| AppError::Unauthorized("Unable to Login".into()))?;

    let account = credentials::authenticate(&pool, &payload.email, &payload.password).await?;
    let token = sessions.issue_token(&pool, account.id).await?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        account: PublicAccount::from(&account),
        token,
    }))
}

/// Logout the current session
///
/// Revokes exactly the token that authenticated this request; sessions on
/// other devices stay valid.
#[post("/logout")]
pub async fn logout(
    pool: web::Data<PgPool>,
    sessions: web::Data<SessionManager>,
    authed: AuthedAccount,
) -> Result<impl Responder, AppError> {
    sessions.revoke(&pool, authed.account.id, &authed.token).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Logout everywhere
#[post("/logoutAll")]
pub async fn logout_all(
    pool: web::Data<PgPool>,
    sessions: web::Data<SessionManager>,
    authed: AuthedAccount,
) -> Result<impl Responder, AppError> {
    sessions.revoke_all(&pool, authed.account.id).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Public view of the authenticated account
#[get("/me")]
pub async fn get_self(authed: AuthedAccount) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(PublicAccount::from(&authed.account)))
}

/// Update the authenticated account
///
/// Only {name, email, password, age} may appear in the body; anything else
/// fails before any mutation is applied.
#[patch("/me")]
pub async fn update_self(
    pool: web::Data<PgPool>,
    authed: AuthedAccount,
    body: web::Json<serde_json::Value>,
) -> Result<impl Responder, AppError> {
    let account = credentials::update_fields(&pool, authed.account.id, &body).await?;
    Ok(HttpResponse::Ok().json(PublicAccount::from(&account)))
}

/// Delete the authenticated account
///
/// Removes every owned task and the account in one unit, then responds
/// with the deleted account's public view. The goodbye notification is a
/// downstream concern and can never fail or delay this response.
#[delete("/me")]
pub async fn delete_self(
    pool: web::Data<PgPool>,
    authed: AuthedAccount,
) -> Result<impl Responder, AppError> {
    let view = PublicAccount::from(&authed.account);
    cascade::delete_account(&pool, authed.account.id).await?;

    log::info!("account {} deleted, goodbye {}", view.id, view.email);

    Ok(HttpResponse::Ok().json(view))
}
