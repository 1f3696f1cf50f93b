//! Removal of undeclared keys from validated output.
//!
//! Keys are kept only when the governing object schema lists them under
//! `properties`. An object schema without `properties` is opaque and its
//! value is kept whole. `$ref` subschemas are opaque as well.

use serde_json::Value;

/// Strip every key of `value` that `schema` does not declare.
pub(crate) fn strip_undeclared(schema: &Value, value: Value) -> Value {
    match value {
        Value::Object(map) => match schema.get("properties").and_then(Value::as_object) {
            Some(properties) => Value::Object(
                map.into_iter()
                    .filter_map(|(key, v)| {
                        properties
                            .get(&key)
                            .map(|sub| (key.clone(), strip_undeclared(sub, v)))
                    })
                    .collect(),
            ),
            None => Value::Object(map),
        },
        Value::Array(items) => match schema.get("items") {
            Some(item_schema) if item_schema.is_object() => Value::Array(
                items
                    .into_iter()
                    .map(|v| strip_undeclared(item_schema, v))
                    .collect(),
            ),
            _ => Value::Array(items),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_only_declared_keys_recursively() {
        let schema = json!({
            "properties": {
                "name": {},
                "profile": { "properties": { "city": {} } }
            }
        });
        let out = strip_undeclared(
            &schema,
            json!({ "name": "a", "x": 1, "profile": { "city": "Lahore", "y": 2 } }),
        );
        assert_eq!(out, json!({ "name": "a", "profile": { "city": "Lahore" } }));
    }

    #[test]
    fn opaque_objects_are_kept_whole() {
        let schema = json!({ "properties": { "meta": { "type": "object" } } });
        let out = strip_undeclared(&schema, json!({ "meta": { "anything": true } }));
        assert_eq!(out, json!({ "meta": { "anything": true } }));
    }

    #[test]
    fn array_items_are_stripped() {
        let schema = json!({ "items": { "properties": { "id": {} } } });
        let out = strip_undeclared(&schema, json!([{ "id": 1, "junk": 0 }]));
        assert_eq!(out, json!([{ "id": 1 }]));
    }
}
