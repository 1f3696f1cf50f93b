//! Type coercion and defaults, applied before validation.
//!
//! Only unambiguous conversions are made: a string is converted when the
//! schema declares a scalar type that does not include `string` and the
//! text parses cleanly. Anything else is left for the validator to reject.

use serde_json::{Map, Number, Value};

/// Return a copy of `value` with scalars coerced and defaults filled in,
/// following `schema`.
pub(crate) fn coerce(schema: &Value, value: &Value) -> Value {
    let Some(schema_obj) = schema.as_object() else {
        return value.clone();
    };

    match value {
        Value::String(text) => coerce_string(schema_obj, text).unwrap_or_else(|| value.clone()),
        Value::Object(map) => Value::Object(coerce_object(schema_obj, map)),
        Value::Array(items) => match schema_obj.get("items") {
            Some(item_schema) if item_schema.is_object() => {
                Value::Array(items.iter().map(|v| coerce(item_schema, v)).collect())
            }
            _ => value.clone(),
        },
        _ => value.clone(),
    }
}

fn coerce_object(schema: &Map<String, Value>, map: &Map<String, Value>) -> Map<String, Value> {
    let Some(Value::Object(properties)) = schema.get("properties") else {
        return map.clone();
    };

    let mut out = Map::with_capacity(map.len());
    for (key, value) in map {
        let coerced = match properties.get(key) {
            Some(sub) => coerce(sub, value),
            None => value.clone(),
        };
        out.insert(key.clone(), coerced);
    }
    for (key, sub) in properties {
        if out.contains_key(key) {
            continue;
        }
        if let Some(default) = sub.get("default") {
            out.insert(key.clone(), default.clone());
        }
    }
    out
}

fn coerce_string(schema: &Map<String, Value>, text: &str) -> Option<Value> {
    let declared = declared_types(schema);
    if declared.is_empty() || declared.contains(&"string") {
        return None;
    }

    let trimmed = text.trim();
    if declared.contains(&"boolean") {
        match trimmed {
            "true" => return Some(Value::Bool(true)),
            "false" => return Some(Value::Bool(false)),
            _ => {}
        }
    }
    if declared.contains(&"integer") || declared.contains(&"number") {
        if let Ok(i) = trimmed.parse::<i64>() {
            return Some(Value::from(i));
        }
    }
    if declared.contains(&"number") {
        if let Some(n) = trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
            return Some(Value::Number(n));
        }
    }
    None
}

fn declared_types(schema: &Map<String, Value>) -> Vec<&str> {
    match schema.get("type") {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(ts)) => ts.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn boolean_strings_become_booleans() {
        let schema = json!({ "type": "boolean" });
        assert_eq!(coerce(&schema, &json!("true")), json!(true));
        assert_eq!(coerce(&schema, &json!(" false ")), json!(false));
        assert_eq!(coerce(&schema, &json!("yes")), json!("yes"));
    }

    #[test]
    fn numeric_strings_become_numbers() {
        assert_eq!(coerce(&json!({ "type": "integer" }), &json!("12")), json!(12));
        assert_eq!(coerce(&json!({ "type": "number" }), &json!("1.5")), json!(1.5));
        assert_eq!(coerce(&json!({ "type": "integer" }), &json!("1.5")), json!("1.5"));
    }

    #[test]
    fn string_typed_values_are_left_alone() {
        let schema = json!({ "type": ["string", "integer"] });
        assert_eq!(coerce(&schema, &json!("12")), json!("12"));
        assert_eq!(coerce(&json!({}), &json!("12")), json!("12"));
    }

    #[test]
    fn defaults_fill_missing_properties_only() {
        let schema = json!({
            "type": "object",
            "properties": {
                "remember_me": { "type": "boolean", "default": false },
                "ip": { "type": "string" }
            }
        });
        assert_eq!(coerce(&schema, &json!({})), json!({ "remember_me": false }));
        assert_eq!(
            coerce(&schema, &json!({ "remember_me": "true" })),
            json!({ "remember_me": true })
        );
    }

    #[test]
    fn nested_objects_and_arrays_are_followed() {
        let schema = json!({
            "type": "object",
            "properties": {
                "profile": {
                    "type": "object",
                    "properties": { "age": { "type": "integer" } }
                },
                "scores": { "type": "array", "items": { "type": "number" } }
            }
        });
        let out = coerce(
            &schema,
            &json!({ "profile": { "age": "30" }, "scores": ["1", "2.5"], "extra": "x" }),
        );
        assert_eq!(
            out,
            json!({ "profile": { "age": 30 }, "scores": [1, 2.5], "extra": "x" })
        );
    }
}
