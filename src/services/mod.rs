//! Service layer holding the core business logic: credential storage,
//! session management, cascade deletion, and the owner-scoped task query
//! engine. Route handlers stay thin adapters over these functions.

pub mod cascade;
pub mod credentials;
pub mod sessions;
pub mod task_query;

pub use sessions::SessionManager;

use crate::error::AppError;
use serde_json::Value;

/// Checks a raw update payload against an allow-list of field names.
///
/// Runs before any deserialization or mutation: a payload naming a field
/// outside the allow-list is rejected wholesale, so a partially valid
/// request can never partially apply.
pub fn ensure_allowed_fields(body: &Value, allowed: &[&str]) -> Result<(), AppError> {
    let map = body
        .as_object()
        .ok_or_else(|| AppError::BadRequest("expected a JSON object".into()))?;

    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(AppError::ValidationError(format!(
                "invalid updates: \"{}\" is not an allowed field",
                key
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ensure_allowed_fields_accepts_subset() {
        let body = json!({ "description": "buy milk" });
        assert!(ensure_allowed_fields(&body, &["description", "completed"]).is_ok());

        let body = json!({});
        assert!(ensure_allowed_fields(&body, &["description", "completed"]).is_ok());
    }

    #[test]
    fn test_ensure_allowed_fields_rejects_unknown() {
        let body = json!({ "description": "buy milk", "owner_id": "someone-else" });
        match ensure_allowed_fields(&body, &["description", "completed"]) {
            Err(AppError::ValidationError(msg)) => assert!(msg.contains("owner_id")),
            other => panic!("expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_ensure_allowed_fields_rejects_non_object() {
        let body = json!(["description"]);
        assert!(matches!(
            ensure_allowed_fields(&body, &["description"]),
            Err(AppError::BadRequest(_))
        ));
    }
}
