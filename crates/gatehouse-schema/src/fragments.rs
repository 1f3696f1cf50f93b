//! Reusable schema fragments for common field formats.

use serde_json::{json, Value};

/// Twelve-byte document identifier rendered as 24 hex characters.
pub const OBJECT_ID_PATTERN: &str = "^[0-9a-fA-F]{24}$";

/// Email address with at least two domain segments and a `com`, `net` or
/// `org` top-level domain.
pub const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)*\.(com|net|org)$";

/// ISO 8601 date, optionally with time and offset.
pub const ISO_DATE_PATTERN: &str =
    r"^\d{4}-\d{2}-\d{2}(T\d{2}:\d{2}(:\d{2}(\.\d+)?)?(Z|[+-]\d{2}:?\d{2})?)?$";

/// A string holding an ObjectId.
pub fn object_id() -> Value {
    json!({
        "type": "string",
        "pattern": OBJECT_ID_PATTERN,
        "x-messages": { "pattern": "must be a valid ObjectId" }
    })
}

/// A string holding an email address.
pub fn email() -> Value {
    json!({
        "type": "string",
        "pattern": EMAIL_PATTERN,
        "x-messages": { "pattern": "must be a valid email" }
    })
}

/// A string holding an ISO 8601 date.
pub fn iso_date() -> Value {
    json!({
        "type": "string",
        "pattern": ISO_DATE_PATTERN,
        "x-messages": { "pattern": "must be in ISO 8601 date format" }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidationSchema;

    fn schema_for(field: Value) -> ValidationSchema {
        ValidationSchema::compile(json!({
            "type": "object",
            "properties": { "f": field }
        }))
        .unwrap()
    }

    #[test]
    fn email_accepts_allowed_tlds_only() {
        let schema = schema_for(email());
        assert!(schema.is_valid(&json!({ "f": "ana@example.com" })));
        assert!(schema.is_valid(&json!({ "f": "ana@mail.example.org" })));
        assert!(!schema.is_valid(&json!({ "f": "ana@example.io" })));
        assert!(!schema.is_valid(&json!({ "f": "ana@localhost" })));
        assert!(!schema.is_valid(&json!({ "f": "not an email" })));
    }

    #[test]
    fn email_violation_uses_friendly_message() {
        let err = schema_for(email())
            .validate(&json!({ "f": "nope" }))
            .unwrap_err();
        assert_eq!(err.violations()[0].message, r#""f" must be a valid email"#);
        assert_eq!(err.violations()[0].kind, "string.pattern.base");
    }

    #[test]
    fn object_id_is_24_hex_chars() {
        let schema = schema_for(object_id());
        assert!(schema.is_valid(&json!({ "f": "507f1f77bcf86cd799439011" })));
        assert!(!schema.is_valid(&json!({ "f": "507f1f77bcf86cd79943901" })));
        assert!(!schema.is_valid(&json!({ "f": "zzzzzzzzzzzzzzzzzzzzzzzz" })));
    }

    #[test]
    fn iso_date_accepts_dates_and_timestamps() {
        let schema = schema_for(iso_date());
        assert!(schema.is_valid(&json!({ "f": "1990-04-01" })));
        assert!(schema.is_valid(&json!({ "f": "2024-01-31T10:15:00Z" })));
        assert!(schema.is_valid(&json!({ "f": "2024-01-31T10:15:00.123+05:00" })));
        assert!(!schema.is_valid(&json!({ "f": "31/01/2024" })));
    }
}
