//! # Validation Pipeline
//!
//! The per-request entry point: resolve a provider, decorate the raw
//! payload, validate the candidate, and package the result.
//!
//! Schema violations are a normal outcome, reported through
//! [`ValidationOutcome`]. Only resolution failures (a configuration
//! defect) are returned as errors.

use std::sync::Arc;

use gatehouse_core::{ValidationError, Violation};
use serde::Serialize;
use serde_json::Value;

use crate::registry::PluginRegistry;
use crate::resolver::{PluginError, PluginResolver};

/// Message placed in [`ErrorResponse::error`].
pub const VALIDATION_FAILED: &str = "Validation failed";

/// Pipeline settings.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Include raw payloads in logs. Off by default since payloads
    /// carry credentials.
    pub log_payloads: bool,
}

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    pub subtype: Option<String>,
}

impl ValidateOptions {
    pub fn subtype(subtype: impl Into<String>) -> Self {
        Self {
            subtype: Some(subtype.into()),
        }
    }
}

/// Client-ready summary of a failed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Vec<FieldDetail>,
}

/// One failing field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDetail {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl From<&Violation> for FieldDetail {
    fn from(v: &Violation) -> Self {
        Self {
            field: v.field(),
            message: v.client_message(),
            value: v.value.clone(),
        }
    }
}

/// Result of one pipeline run. Exactly one of `validated_data` and
/// `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub error: Option<ValidationError>,
    pub validated_data: Option<Value>,
    pub error_response: Option<ErrorResponse>,
}

impl ValidationOutcome {
    fn valid(data: Value) -> Self {
        Self {
            is_valid: true,
            error: None,
            validated_data: Some(data),
            error_response: None,
        }
    }

    fn invalid(error: ValidationError) -> Self {
        let details = error.violations().iter().map(FieldDetail::from).collect();
        Self {
            is_valid: false,
            error: Some(error),
            validated_data: None,
            error_response: Some(ErrorResponse {
                error: VALIDATION_FAILED.to_string(),
                details,
            }),
        }
    }

    /// The validated data, or the violations.
    pub fn into_result(self) -> Result<Value, ValidationError> {
        match (self.validated_data, self.error) {
            (Some(data), _) => Ok(data),
            (None, Some(error)) => Err(error),
            (None, None) => Err(ValidationError::new(Vec::new())),
        }
    }
}

/// Resolve → decorate → validate.
#[derive(Debug, Clone)]
pub struct ValidationPipeline {
    resolver: PluginResolver,
    config: PipelineConfig,
}

impl ValidationPipeline {
    pub fn new(registry: Arc<PluginRegistry>, config: PipelineConfig) -> Self {
        Self {
            resolver: PluginResolver::new(registry),
            config,
        }
    }

    pub fn resolver(&self) -> &PluginResolver {
        &self.resolver
    }

    /// Validate `raw` against the provider for `resource`.
    ///
    /// # Errors
    ///
    /// Returns a [`PluginError`] if no provider can be resolved. Schema
    /// violations are not errors; see [`ValidationOutcome::is_valid`].
    pub fn validate(
        &self,
        resource: &str,
        raw: &Value,
        options: &ValidateOptions,
    ) -> Result<ValidationOutcome, PluginError> {
        let subtype = options.subtype.as_deref();
        if self.config.log_payloads {
            tracing::info!(resource, subtype = ?subtype, payload = %raw, "validating payload");
        } else {
            tracing::info!(resource, subtype = ?subtype, "validating payload");
        }

        let provider = self.resolver.resolve(resource, subtype).map_err(|e| {
            tracing::error!(resource, subtype = ?subtype, error = %e, "plugin resolution failed");
            e
        })?;

        let candidate = provider.decorate(raw);
        match provider.schema().validate(&candidate) {
            Ok(data) => Ok(ValidationOutcome::valid(data)),
            Err(error) => {
                tracing::debug!(
                    resource = provider.resource(),
                    subtype = provider.subtype(),
                    violations = error.len(),
                    "payload rejected"
                );
                Ok(ValidationOutcome::invalid(error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decorate::Decoration;
    use crate::layout::PluginLayout;
    use crate::provider::PluginExports;
    use serde_json::json;

    fn pipeline() -> ValidationPipeline {
        let decoration = Decoration::default().trim(["email"]).lowercase(["email"]);
        let layout = PluginLayout::new().dir("Accounts", |d| {
            d.file(
                "create",
                PluginExports::new()
                    .schema(|| {
                        json!({
                            "type": "object",
                            "required": ["email", "age"],
                            "properties": {
                                "email": { "type": "string", "minLength": 3 },
                                "age": { "type": "integer", "minimum": 18 }
                            }
                        })
                    })
                    .decorate(move |raw| decoration.apply(raw)),
            )
        });
        ValidationPipeline::new(
            Arc::new(PluginRegistry::load(&layout)),
            PipelineConfig::default(),
        )
    }

    #[test]
    fn valid_payload_is_decorated_and_coerced() {
        let outcome = pipeline()
            .validate(
                "Accounts",
                &json!({ "email": " A@B.COM ", "age": "21" }),
                &ValidateOptions::default(),
            )
            .unwrap();
        assert!(outcome.is_valid);
        assert!(outcome.error.is_none());
        assert!(outcome.error_response.is_none());
        assert_eq!(outcome.validated_data, Some(json!({ "email": "a@b.com", "age": 21 })));
    }

    #[test]
    fn invalid_payload_builds_error_response() {
        let outcome = pipeline()
            .validate(
                "Accounts",
                &json!({ "email": "a@b.com", "age": 12 }),
                &ValidateOptions::default(),
            )
            .unwrap();
        assert!(!outcome.is_valid);
        assert!(outcome.validated_data.is_none());
        let response = outcome.error_response.unwrap();
        assert_eq!(response.error, "Validation failed");
        assert_eq!(
            response.details,
            vec![FieldDetail {
                field: "age".into(),
                message: "age must be greater than or equal to 18".into(),
                value: Some(json!(12)),
            }]
        );
    }

    #[test]
    fn outcome_serializes_with_camel_case_and_nulls() {
        let outcome = pipeline()
            .validate("Accounts", &json!({}), &ValidateOptions::default())
            .unwrap();
        let body = serde_json::to_value(&outcome).unwrap();
        assert_eq!(body["isValid"], json!(false));
        assert_eq!(body["validatedData"], Value::Null);
        assert_eq!(body["errorResponse"]["details"].as_array().unwrap().len(), 2);
        assert_eq!(body["error"][0]["type"], json!("any.required"));
        assert!(body["errorResponse"]["details"][0].get("value").is_none());
    }

    #[test]
    fn unknown_resource_is_an_error() {
        let err = pipeline()
            .validate("Nope", &json!({}), &ValidateOptions::default())
            .unwrap_err();
        assert!(matches!(err, PluginError::NotFound { .. }));
    }

    #[test]
    fn into_result_yields_data_or_violations() {
        let p = pipeline();
        let ok = p
            .validate(
                "Accounts",
                &json!({ "email": "abc", "age": 30 }),
                &ValidateOptions::default(),
            )
            .unwrap();
        assert_eq!(ok.into_result().unwrap(), json!({ "email": "abc", "age": 30 }));
        let bad = p
            .validate("Accounts", &json!({ "email": "abc" }), &ValidateOptions::default())
            .unwrap();
        assert_eq!(bad.into_result().unwrap_err().len(), 1);
    }
}
