use crate::error::AppError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims encoded within a session token.
///
/// There is no `exp` claim on purpose: a token stays valid until it is
/// revoked from its account's token collection, and the collection check
/// is what terminates a session.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The account identifier the session belongs to.
    pub sub: Uuid,
    /// Unique token identifier, so that two tokens issued to the same
    /// account in the same second are still distinct strings.
    pub jti: Uuid,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
}

/// Signs and decodes session tokens with a process-wide secret.
///
/// Built once at startup from configuration and injected where needed;
/// the secret is never read from the environment after construction.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Revocation is the only termination mechanism; tokens carry no
        // expiry and must not be rejected for lacking one.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Produces a new signed token for the given account. Every call
    /// yields a distinct token value.
    pub fn sign(&self, account_id: Uuid) -> Result<String, AppError> {
        let claims = Claims {
            sub: account_id,
            jti: Uuid::new_v4(),
            iat: chrono::Utc::now().timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to sign token: {}", e)))
    }

    /// Checks the signature and structure of a token and returns its
    /// claims. This proves who the token was issued to, not that the
    /// session is still live; the caller must also check the account's
    /// token collection.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        Ok(decode::<Claims>(token, &self.decoding, &self.validation)?.claims)
    }
}
