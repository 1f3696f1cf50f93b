//! # Compiled Schemas
//!
//! [`ValidationSchema`] owns a prepared JSON Schema document and the
//! compiled `jsonschema` validator built from it.
//!
//! ## Preparation
//!
//! Before compilation, every object schema that declares `properties` and
//! leaves `additionalProperties` unset is closed with
//! `additionalProperties: false`. The rule is applied recursively through
//! `properties`, `patternProperties`, `items`, `prefixItems`, `$defs`,
//! `definitions`, the applicator arrays (`allOf`, `anyOf`, `oneOf`) and
//! `not`/`if`/`then`/`else`. Schemas composed with `allOf` should therefore
//! set `additionalProperties` explicitly on each branch.
//!
//! ## Thread Safety
//!
//! `ValidationSchema` is `Send + Sync`. It is compiled once and shared
//! read-only by every request.

use std::fmt;

use gatehouse_core::{ValidationError, Violation};
use jsonschema::{Draft, Validator};
use serde_json::Value;
use thiserror::Error;

use crate::{coerce, report, strip};

/// Keywords whose value is a map of name → subschema.
const SCHEMA_MAP_KEYWORDS: &[&str] = &["properties", "patternProperties", "$defs", "definitions"];

/// Keywords whose value is a single subschema.
const SCHEMA_KEYWORDS: &[&str] = &[
    "items",
    "additionalProperties",
    "not",
    "if",
    "then",
    "else",
    "contains",
];

/// Keywords whose value is an array of subschemas.
const SCHEMA_ARRAY_KEYWORDS: &[&str] = &["allOf", "anyOf", "oneOf", "prefixItems"];

/// Error building a [`ValidationSchema`].
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The ruleset root must be a JSON object.
    #[error("schema must be a JSON object, found {found}")]
    NotAnObject {
        /// JSON type of the value that was supplied.
        found: &'static str,
    },

    /// The compiled validator could not be built (e.g., invalid schema).
    #[error("schema compile error: {reason}")]
    Compile {
        /// Reason the validator could not be built.
        reason: String,
    },
}

/// An immutable, compiled validation ruleset.
pub struct ValidationSchema {
    /// Prepared schema document (unknown keys closed).
    document: Value,
    validator: Validator,
}

impl fmt::Debug for ValidationSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationSchema")
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

impl ValidationSchema {
    /// Prepare and compile a JSON Schema document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NotAnObject`] if `schema` is not an object and
    /// [`SchemaError::Compile`] if `jsonschema` rejects it.
    pub fn compile(schema: Value) -> Result<Self, SchemaError> {
        if !schema.is_object() {
            return Err(SchemaError::NotAnObject {
                found: json_type(&schema),
            });
        }

        let mut document = schema;
        close_objects(&mut document);

        let validator = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&document)
            .map_err(|e| SchemaError::Compile {
                reason: e.to_string(),
            })?;

        Ok(Self {
            document,
            validator,
        })
    }

    /// The prepared schema document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Validate a candidate payload.
    ///
    /// On success returns the coerced candidate with undeclared keys
    /// stripped. On failure returns every violation found.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] holding at least one [`Violation`].
    pub fn validate(&self, candidate: &Value) -> Result<Value, ValidationError> {
        let coerced = coerce::coerce(&self.document, candidate);

        let violations: Vec<Violation> = self
            .validator
            .iter_errors(&coerced)
            .flat_map(|e| report::violations(&self.document, &e))
            .collect();

        if violations.is_empty() {
            Ok(strip::strip_undeclared(&self.document, coerced))
        } else {
            tracing::trace!(count = violations.len(), "payload rejected by schema");
            Err(ValidationError::new(violations))
        }
    }

    /// Returns true if `candidate` validates without violations.
    pub fn is_valid(&self, candidate: &Value) -> bool {
        let coerced = coerce::coerce(&self.document, candidate);
        self.validator.is_valid(&coerced)
    }
}

/// Close every object schema that declares `properties` but leaves
/// `additionalProperties` unset.
fn close_objects(schema: &mut Value) {
    let Some(obj) = schema.as_object_mut() else {
        return;
    };

    if obj.contains_key("properties") && !obj.contains_key("additionalProperties") {
        obj.insert("additionalProperties".to_string(), Value::Bool(false));
    }

    for keyword in SCHEMA_MAP_KEYWORDS {
        if let Some(Value::Object(map)) = obj.get_mut(*keyword) {
            map.values_mut().for_each(close_objects);
        }
    }
    for keyword in SCHEMA_KEYWORDS {
        if let Some(sub) = obj.get_mut(*keyword) {
            close_objects(sub);
        }
    }
    for keyword in SCHEMA_ARRAY_KEYWORDS {
        if let Some(Value::Array(items)) = obj.get_mut(*keyword) {
            items.iter_mut().for_each(close_objects);
        }
    }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
