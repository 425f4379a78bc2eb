pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::account::{not_blank, password_not_literal};
use crate::models::PublicAccount;

// Re-export necessary items
pub use extractors::AuthedAccount;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenSigner};

/// Payload for a login request.
///
/// Only shape is validated here; whether the credentials match anything is
/// the credential store's business, and it answers uniformly either way.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Payload for a new account registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name. Trimmed before storage; must not be blank.
    #[validate(custom(function = "not_blank", message = "name must not be blank"))]
    pub name: String,
    /// Must be a valid email. Lowercased before storage and unique across
    /// all accounts.
    #[validate(email)]
    pub email: String,
    /// At least 7 characters and must not contain the literal "password".
    #[validate(
        length(min = 7, message = "password must be at least 7 characters"),
        custom(
            function = "password_not_literal",
            message = "password cannot contain \"password\""
        )
    )]
    pub password: String,
    /// Optional; defaults to 0, never negative.
    #[validate(range(min = 0, message = "age cannot be negative"))]
    pub age: Option<i32>,
}

/// Response body for successful registration or login: the public view of
/// the account plus a freshly issued session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub account: PublicAccount,
    pub token: String,
}
