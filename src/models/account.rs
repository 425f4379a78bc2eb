use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// An account row as stored in the database.
///
/// Deliberately does not implement `Serialize`: the password hash, the
/// session token collection, and the avatar bytes must never reach a wire
/// format. The only outward representation is [`PublicAccount`].
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub age: i32,
    /// Active session tokens, one per device. Every element was produced
    /// by the session manager and is unique within the account.
    pub tokens: Vec<String>,
    pub avatar: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The serialized view of an account exposed to callers.
///
/// Password hash, tokens, and avatar are omitted by construction, not by
/// a skip attribute, so a new field on [`Account`] stays private until
/// someone adds it here on purpose.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicAccount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Account> for PublicAccount {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.trim().to_string(),
            email: account.email.clone(),
            age: account.age,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Partial update payload for `PATCH /users/me`.
///
/// The allowed-field check happens on the raw JSON map before this struct
/// is ever deserialized; by the time validation runs here, only the four
/// permitted fields can be present.
#[derive(Debug, Deserialize, Validate)]
pub struct AccountUpdate {
    #[validate(custom(function = "not_blank", message = "name must not be blank"))]
    pub name: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(
        length(min = 7, message = "password must be at least 7 characters"),
        custom(
            function = "password_not_literal",
            message = "password cannot contain \"password\""
        )
    )]
    pub password: Option<String>,

    #[validate(range(min = 0, message = "age cannot be negative"))]
    pub age: Option<i32>,
}

impl AccountUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none() && self.age.is_none()
    }
}

/// Rejects values that are empty after trimming.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Rejects passwords containing the literal substring "password",
/// case-insensitively.
pub fn password_not_literal(value: &str) -> Result<(), ValidationError> {
    if value.to_lowercase().contains("password") {
        return Err(ValidationError::new("password_literal"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_account() -> Account {
        let now = Utc::now();
        Account {
            id: Uuid::new_v4(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$2b$12$abcdefghijklmnopqrstuv".to_string(),
            age: 30,
            tokens: vec!["token-one".to_string(), "token-two".to_string()],
            avatar: Some(vec![0xDE, 0xAD]),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_public_view_omits_sensitive_fields() {
        let account = sample_account();
        let view = PublicAccount::from(&account);
        let json = serde_json::to_value(&view).unwrap();
        let object = json.as_object().unwrap();

        assert!(object.contains_key("id"));
        assert!(object.contains_key("name"));
        assert!(object.contains_key("email"));
        assert!(object.contains_key("age"));
        assert!(object.contains_key("created_at"));
        assert!(object.contains_key("updated_at"));

        assert!(!object.contains_key("password"));
        assert!(!object.contains_key("password_hash"));
        assert!(!object.contains_key("tokens"));
        assert!(!object.contains_key("avatar"));
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("Alice").is_ok());
        assert!(not_blank("  padded  ").is_ok());
        assert!(not_blank("").is_err());
        assert!(not_blank("   ").is_err());
    }

    #[test]
    fn test_password_not_literal() {
        assert!(password_not_literal("secret123").is_ok());
        assert!(password_not_literal("password1").is_err());
        assert!(password_not_literal("MyPaSsWoRd!").is_err());
    }

    #[test]
    fn test_account_update_validation() {
        let update = AccountUpdate {
            name: Some("Alice".to_string()),
            email: Some("alice@example.com".to_string()),
            password: Some("secret123".to_string()),
            age: Some(30),
        };
        assert!(update.validate().is_ok());
        assert!(!update.is_empty());

        let blank_name = AccountUpdate {
            name: Some("   ".to_string()),
            email: None,
            password: None,
            age: None,
        };
        assert!(blank_name.validate().is_err());

        let bad_email = AccountUpdate {
            name: None,
            email: Some("not-an-email".to_string()),
            password: None,
            age: None,
        };
        assert!(bad_email.validate().is_err());

        let negative_age = AccountUpdate {
            name: None,
            email: None,
            password: None,
            age: Some(-1),
        };
        assert!(negative_age.validate().is_err());

        let literal_password = AccountUpdate {
            name: None,
            email: None,
            password: Some("password123".to_string()),
            age: None,
        };
        assert!(literal_password.validate().is_err());

        let empty = AccountUpdate {
            name: None,
            email: None,
            password: None,
            age: None,
        };
        assert!(empty.validate().is_ok());
        assert!(empty.is_empty());
    }
}
