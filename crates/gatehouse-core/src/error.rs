//! # Error Types
//!
//! The closed set of errors that flow from the validation pipeline and
//! business logic towards the [`ErrorNormalizer`](crate::ErrorNormalizer).
//!
//! Each kind is a distinct type with its own structured payload, and
//! [`RequestError`] tags them explicitly. The normalizer dispatches on the
//! variant, never on the shape of the value.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Remove every single and double quote character from a message.
///
/// Validation messages quote field labels (`"email" is required`); clients
/// receive them without the quotes (`email is required`).
pub fn strip_quotes(message: &str) -> String {
    message.chars().filter(|c| *c != '"' && *c != '\'').collect()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A single field-level validation violation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Human-readable message, with the field label in double quotes.
    pub message: String,
    /// Machine-readable violation type, e.g. `any.required` or `string.min`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Path segments from the payload root to the offending attribute.
    pub path: Vec<String>,
    /// The offending input value, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Violation {
    /// Create a violation without an offending value.
    pub fn new(path: Vec<String>, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: kind.into(),
            path,
            value: None,
        }
    }

    /// Attach the offending input value.
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Dot-joined path to the offending attribute (`profile.phone`).
    ///
    /// Empty for violations on the payload root.
    pub fn field(&self) -> String {
        self.path.join(".")
    }

    /// The message with quote characters stripped, for client display.
    pub fn client_message(&self) -> String {
        strip_quotes(&self.message)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root): {} [{}]", self.message, self.kind)
        } else {
            write!(f, "{}: {} [{}]", self.field(), self.message, self.kind)
        }
    }
}

/// The exhaustive list of violations found in one payload.
///
/// Never empty when produced by the schema layer: a payload with zero
/// violations is valid and yields no `ValidationError` at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    /// Wrap a list of violations.
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

/// An intentional business-rule rejection with its own HTTP status.
///
/// The carried payload is returned to the client after normalization, so
/// it must only hold client-safe fields. Auxiliary `data` is merged into
/// the payload when it is an object.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct DomainError {
    status: Option<u16>,
    message: String,
    payload: Map<String, Value>,
    data: Option<Value>,
}

impl DomainError {
    /// A domain error with an explicit status and an empty payload.
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            payload: Map::new(),
            data: None,
        }
    }

    /// A domain error raised without a status. Normalizes to 500.
    pub fn without_status(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            payload: Map::new(),
            data: None,
        }
    }

    /// A domain error whose payload carries the conventional
    /// `{statusCode, error, message}` triple for its status.
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut payload = Map::new();
        payload.insert("statusCode".to_string(), Value::from(status));
        payload.insert("error".to_string(), Value::from(reason_phrase(status)));
        payload.insert("message".to_string(), Value::from(message.clone()));
        Self {
            status: Some(status),
            message,
            payload,
            data: None,
        }
    }

    /// 400 Bad Request.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_status(400, message)
    }

    /// 401 Unauthorized.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::with_status(401, message)
    }

    /// 403 Forbidden.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::with_status(403, message)
    }

    /// 404 Not Found.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_status(404, message)
    }

    /// 409 Conflict.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::with_status(409, message)
    }

    /// 500 Internal Server Error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_status(500, message)
    }

    /// Attach auxiliary error data.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Replace the carried payload.
    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = payload;
        self
    }

    /// The carried HTTP status, if any.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// The error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The carried payload.
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Auxiliary error data, if any.
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }
}

/// Standard reason phrase for the statuses domain errors commonly carry.
fn reason_phrase(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Every error kind the normalizer understands.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Schema validation found one or more violations.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Business logic rejected the request.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// Anything unexpected: configuration defects, storage failures, bugs.
    #[error("infrastructure error: {0:#}")]
    Infrastructure(anyhow::Error),
}

impl RequestError {
    /// Wrap an arbitrary error as an infrastructure failure.
    pub fn infrastructure(err: impl Into<anyhow::Error>) -> Self {
        Self::Infrastructure(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strip_quotes_removes_both_quote_styles() {
        assert_eq!(strip_quotes(r#""email" is required"#), "email is required");
        assert_eq!(strip_quotes("'ip' must be a string"), "ip must be a string");
        assert_eq!(strip_quotes("no quotes"), "no quotes");
    }

    #[test]
    fn violation_field_is_dot_joined() {
        let v = Violation::new(
            vec!["profile".into(), "phone".into()],
            "string.min",
            r#""phone" length must be at least 11 characters long"#,
        );
        assert_eq!(v.field(), "profile.phone");
        assert_eq!(
            v.client_message(),
            "phone length must be at least 11 characters long"
        );
    }

    #[test]
    fn violation_serializes_kind_as_type_and_skips_missing_value() {
        let v = Violation::new(vec!["email".into()], "any.required", r#""email" is required"#);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["type"], "any.required");
        assert!(json.get("value").is_none());

        let with_value = v.with_value(json!("x"));
        let json = serde_json::to_value(&with_value).unwrap();
        assert_eq!(json["value"], "x");
    }

    #[test]
    fn validation_error_display_lists_every_violation() {
        let err = ValidationError::new(vec![
            Violation::new(vec!["email".into()], "any.required", r#""email" is required"#),
            Violation::new(vec![], "object.min", r#""value" must have at least 1 key"#),
        ]);
        let display = err.to_string();
        assert!(display.contains("email:"));
        assert!(display.contains("(root):"));
        assert_eq!(err.len(), 2);
    }

    #[test]
    fn with_status_fills_conventional_payload() {
        let err = DomainError::conflict("User already exists");
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.payload()["statusCode"], 409);
        assert_eq!(err.payload()["error"], "Conflict");
        assert_eq!(err.payload()["message"], "User already exists");
    }

    #[test]
    fn new_carries_empty_payload() {
        let err = DomainError::new(404, "User not found");
        assert!(err.payload().is_empty());
        assert_eq!(err.to_string(), "User not found");
    }

    #[test]
    fn request_error_from_domain_and_validation() {
        let e: RequestError = DomainError::not_found("x").into();
        assert!(matches!(e, RequestError::Domain(_)));
        let e: RequestError = ValidationError::new(vec![]).into();
        assert!(matches!(e, RequestError::Validation(_)));
        let e = RequestError::infrastructure(anyhow::anyhow!("db down"));
        assert!(e.to_string().contains("db down"));
    }
}
