use std::rc::Rc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use sqlx::PgPool;

use crate::auth::extractors::AuthedAccount;
use crate::error::AppError;
use crate::services::SessionManager;

/// Request gate for every owner-scoped operation.
///
/// Strips the transport framing from the `Authorization` header, resolves
/// the token to an account and live session via the session manager, and
/// stashes the result in request extensions for handlers to extract. Any
/// failure short-circuits with a generic 401; the underlying cause never
/// reaches the caller.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            // Registration and login are the only unauthenticated entry
            // points inside this scope.
            let path = req.path();
            if path == "/api/auth/register" || path == "/api/auth/login" {
                return service.call(req).await;
            }

            let token = match bearer_token(&req) {
                Some(token) => token,
                None => {
                    return Err(AppError::Unauthorized("Please authenticate".into()).into());
                }
            };

            let pool = req
                .app_data::<web::Data<PgPool>>()
                .cloned()
                .ok_or_else(|| {
                    Error::from(AppError::InternalServerError("Database pool missing".into()))
                })?;
            let sessions = req
                .app_data::<web::Data<SessionManager>>()
                .cloned()
                .ok_or_else(|| {
                    Error::from(AppError::InternalServerError("Session manager missing".into()))
                })?;

            let (account, token) = sessions.verify(&pool, &token).await?;
            req.extensions_mut().insert(AuthedAccount { account, token });

            service.call(req).await
        })
    }
}

/// Pulls the token out of the `Authorization` header, tolerating a
/// `Bearer ` prefix or a bare token value.
fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.strip_prefix("Bearer ").unwrap_or(value).to_string())
}
