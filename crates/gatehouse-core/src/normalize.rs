//! # Error Normalizer
//!
//! Converts any [`RequestError`] into one `{code, payload}` shape.
//!
//! Dispatch is by variant, in this order:
//!
//! 1. **Validation**: repackaged as a 400 [`DomainError`] whose message is
//!    a JSON summary `{"status":"failed","details":[{message,type}]}` and
//!    whose auxiliary data carries the per-field details. Then handled by
//!    rule 2.
//! 2. **Domain**: `code` is the carried status (500 when absent); the
//!    payload is the carried payload merged with the auxiliary data plus
//!    `message`, `success: false` and `code`. `statusCode` is removed and a
//!    `null` `data` field is dropped.
//! 3. **Infrastructure**: `500` with a generic message. The error itself
//!    is logged and never leaves the process.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::{DomainError, RequestError, ValidationError};

/// Construction-time settings for the [`ErrorNormalizer`].
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    /// Message returned for infrastructure failures.
    pub internal_message: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            internal_message: "Internal server error".to_string(),
        }
    }
}

/// A response-ready error: HTTP status plus JSON body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedError {
    /// HTTP status code.
    pub code: u16,
    /// JSON body. Always holds `message` and `success: false`.
    pub payload: Map<String, Value>,
}

impl NormalizedError {
    /// The payload's `message` field.
    pub fn message(&self) -> Option<&str> {
        self.payload.get("message").and_then(Value::as_str)
    }

    /// The payload as a JSON value.
    pub fn body(&self) -> Value {
        Value::Object(self.payload.clone())
    }
}

/// JSON summary embedded as the message of a wrapped validation error.
///
/// Field order is part of the wire format (`status` before `details`).
#[derive(Serialize)]
struct ValidationSummary<'a> {
    status: &'static str,
    details: Vec<SummaryDetail<'a>>,
}

#[derive(Serialize)]
struct SummaryDetail<'a> {
    message: String,
    #[serde(rename = "type")]
    kind: &'a str,
}

/// The single convergence point for client-facing error bodies.
///
/// Stateless apart from its configuration; share one instance across
/// requests.
#[derive(Debug, Clone, Default)]
pub struct ErrorNormalizer {
    config: NormalizerConfig,
}

impl ErrorNormalizer {
    /// Create a normalizer with the given configuration.
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Normalize an error into a response-ready `{code, payload}`.
    pub fn normalize(&self, error: &RequestError) -> NormalizedError {
        match error {
            RequestError::Validation(err) => {
                let wrapped = wrap_validation(err);
                self.normalize_domain(&wrapped)
            }
            RequestError::Domain(err) => self.normalize_domain(err),
            RequestError::Infrastructure(err) => {
                tracing::error!(error = %format!("{err:#}"), "unhandled infrastructure error");
                self.internal()
            }
        }
    }

    fn normalize_domain(&self, err: &DomainError) -> NormalizedError {
        let code = err.status().unwrap_or(500);

        let mut payload = err.payload().clone();
        match err.data() {
            Some(Value::Object(extra)) => {
                payload.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            Some(Value::Null) | None => {}
            Some(other) => {
                payload.insert("data".to_string(), other.clone());
            }
        }
        payload.insert("message".to_string(), Value::from(err.message()));
        payload.insert("success".to_string(), Value::Bool(false));
        payload.insert("code".to_string(), Value::from(code));
        payload.remove("statusCode");

        if payload.get("data").is_some_and(Value::is_null) {
            payload.remove("data");
        }

        if code >= 500 {
            tracing::error!(code, reason = err.message(), "domain error with server status");
        } else {
            tracing::debug!(code, reason = err.message(), "domain error");
        }

        NormalizedError { code, payload }
    }

    fn internal(&self) -> NormalizedError {
        let mut payload = Map::new();
        payload.insert(
            "message".to_string(),
            Value::from(self.config.internal_message.as_str()),
        );
        payload.insert("success".to_string(), Value::Bool(false));
        NormalizedError { code: 500, payload }
    }
}

/// Rule 1: repackage a validation error as a 400 domain error.
fn wrap_validation(err: &ValidationError) -> DomainError {
    let summary = ValidationSummary {
        status: "failed",
        details: err
            .violations()
            .iter()
            .map(|v| SummaryDetail {
                message: v.client_message(),
                kind: &v.kind,
            })
            .collect(),
    };
    let message =
        serde_json::to_string(&summary).unwrap_or_else(|_| "Validation failed".to_string());

    let details: Vec<Value> = err
        .violations()
        .iter()
        .map(|v| {
            let mut detail = json!({
                "message": v.client_message(),
                "type": v.kind,
                "path": v.path,
            });
            if let (Some(value), Some(obj)) = (&v.value, detail.as_object_mut()) {
                obj.insert("value".to_string(), value.clone());
            }
            detail
        })
        .collect();

    DomainError::bad_request(message).with_data(json!({ "details": details }))
}
