use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::Account;

/// The authenticated caller, extracted from request extensions.
///
/// `AuthMiddleware` resolves the inbound token and inserts this value;
/// handlers receive the full account plus the literal token string that
/// authenticated the request (logout needs it to revoke exactly that
/// session). Read-only context for the duration of one request.
#[derive(Debug, Clone)]
pub struct AuthedAccount {
    pub account: Account,
    pub token: String,
}

impl FromRequest for AuthedAccount {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthedAccount>().cloned() {
            Some(authed) => ready(Ok(authed)),
            None => {
                // Only reachable if a protected route was mounted outside
                // AuthMiddleware; answer as an auth failure either way.
                let err = AppError::Unauthorized("Please authenticate".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
