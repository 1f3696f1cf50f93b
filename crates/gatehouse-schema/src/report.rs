//! Conversion of `jsonschema` errors into client-facing [`Violation`]s.
//!
//! The failing keyword is the last segment of the error's schema path. Its
//! value (a limit, a pattern, an enum) is read back from the prepared
//! schema document so messages can quote it.

use gatehouse_core::Violation;
use jsonschema::error::ValidationErrorKind;
use jsonschema::ValidationError;
use serde_json::Value;

/// Label used for violations on the payload root.
const ROOT_LABEL: &str = "value";

/// Convert one validator error into one or more violations.
///
/// `additionalProperties` errors name every unexpected key at once; they
/// are split into one violation per key.
pub(crate) fn violations(schema: &Value, error: &ValidationError<'_>) -> Vec<Violation> {
    let path = pointer_segments(&error.instance_path.to_string());
    let schema_path = error.schema_path.to_string();

    match &error.kind {
        ValidationErrorKind::Required { property } => {
            let name = property
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| property.to_string());
            let mut field = path;
            field.push(name.clone());
            vec![Violation::new(
                field,
                "any.required",
                format!("\"{name}\" is required"),
            )]
        }
        ValidationErrorKind::AdditionalProperties { unexpected } => unexpected
            .iter()
            .map(|key| {
                let mut field = path.clone();
                field.push(key.clone());
                let violation =
                    Violation::new(field, "object.unknown", format!("\"{key}\" is not allowed"));
                match error.instance.get(key) {
                    Some(value) => violation.with_value(value.clone()),
                    None => violation,
                }
            })
            .collect(),
        _ => vec![keyword_violation(schema, &schema_path, path, error)],
    }
}

fn keyword_violation(
    schema: &Value,
    schema_path: &str,
    path: Vec<String>,
    error: &ValidationError<'_>,
) -> Violation {
    let (parent_path, keyword) = schema_path.rsplit_once('/').unwrap_or(("", schema_path));
    let label = path.last().map(String::as_str).unwrap_or(ROOT_LABEL).to_string();
    let arg = schema.pointer(schema_path);
    let value = error.instance.clone().into_owned();

    let custom = schema
        .pointer(parent_path)
        .and_then(|parent| parent.get("x-messages"))
        .and_then(|messages| messages.get(keyword))
        .and_then(Value::as_str);

    let (kind, message) = describe(keyword, &label, arg, &value, error);
    let message = match custom {
        Some(suffix) => format!("\"{label}\" {suffix}"),
        None => message,
    };

    Violation::new(path, kind, message).with_value(value)
}

/// Violation type and message for a failing keyword.
fn describe(
    keyword: &str,
    label: &str,
    arg: Option<&Value>,
    value: &Value,
    error: &ValidationError<'_>,
) -> (String, String) {
    let limit = arg.map(display_scalar).unwrap_or_default();
    match keyword {
        "type" => {
            let expected: Vec<&str> = match arg {
                Some(Value::String(t)) => vec![t.as_str()],
                Some(Value::Array(ts)) => ts.iter().filter_map(Value::as_str).collect(),
                _ => Vec::new(),
            };
            match expected.as_slice() {
                [single] => (
                    format!("{single}.base"),
                    format!("\"{label}\" must be {}", with_article(single)),
                ),
                many => (
                    "any.base".to_string(),
                    format!("\"{label}\" must be one of [{}]", many.join(", ")),
                ),
            }
        }
        "minLength" => (
            "string.min".to_string(),
            format!("\"{label}\" length must be at least {limit} characters long"),
        ),
        "maxLength" => (
            "string.max".to_string(),
            format!("\"{label}\" length must be less than or equal to {limit} characters long"),
        ),
        "pattern" => (
            "string.pattern.base".to_string(),
            format!(
                "\"{label}\" with value \"{}\" fails to match the required pattern: {limit}",
                display_scalar(value)
            ),
        ),
        "format" => (
            format!("string.{limit}"),
            format!("\"{label}\" must be a valid {limit}"),
        ),
        "enum" => {
            let options = match arg {
                Some(Value::Array(items)) => items
                    .iter()
                    .map(display_scalar)
                    .collect::<Vec<_>>()
                    .join(", "),
                _ => limit,
            };
            (
                "any.only".to_string(),
                format!("\"{label}\" must be one of [{options}]"),
            )
        }
        "const" => (
            "any.only".to_string(),
            format!("\"{label}\" must be [{limit}]"),
        ),
        "minimum" => (
            "number.min".to_string(),
            format!("\"{label}\" must be greater than or equal to {limit}"),
        ),
        "maximum" => (
            "number.max".to_string(),
            format!("\"{label}\" must be less than or equal to {limit}"),
        ),
        "exclusiveMinimum" => (
            "number.greater".to_string(),
            format!("\"{label}\" must be greater than {limit}"),
        ),
        "exclusiveMaximum" => (
            "number.less".to_string(),
            format!("\"{label}\" must be less than {limit}"),
        ),
        "multipleOf" => (
            "number.multiple".to_string(),
            format!("\"{label}\" must be a multiple of {limit}"),
        ),
        "minProperties" => (
            "object.min".to_string(),
            format!("\"{label}\" must have at least {limit} {}", plural(arg, "key")),
        ),
        "maxProperties" => (
            "object.max".to_string(),
            format!(
                "\"{label}\" must have less than or equal to {limit} {}",
                plural(arg, "key")
            ),
        ),
        "minItems" => (
            "array.min".to_string(),
            format!("\"{label}\" must contain at least {limit} {}", plural(arg, "item")),
        ),
        "maxItems" => (
            "array.max".to_string(),
            format!(
                "\"{label}\" must contain less than or equal to {limit} {}",
                plural(arg, "item")
            ),
        ),
        "uniqueItems" => (
            "array.unique".to_string(),
            format!("\"{label}\" contains a duplicate value"),
        ),
        other => (other.to_string(), format!("\"{label}\" {error}")),
    }
}

fn with_article(type_name: &str) -> String {
    match type_name {
        "integer" | "object" | "array" => format!("an {type_name}"),
        "null" => "null".to_string(),
        _ => format!("a {type_name}"),
    }
}

fn plural(arg: Option<&Value>, noun: &str) -> String {
    match arg.and_then(Value::as_u64) {
        Some(1) => noun.to_string(),
        _ => format!("{noun}s"),
    }
}

/// Render a JSON value without surrounding quotes for strings.
fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Split a JSON Pointer into unescaped segments.
pub(crate) fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .skip(1)
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect()
}
