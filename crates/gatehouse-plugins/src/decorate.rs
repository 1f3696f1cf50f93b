//! Payload decoration helpers.
//!
//! Decoration turns a raw request payload into the candidate that is
//! validated. It must be pure: the same input always yields the same
//! candidate, and re-decorating a validated payload changes nothing.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Drop `null` members at the top level and one nested level down.
///
/// A `null` stands for an absent field. Non-object payloads are returned
/// unchanged so that validation can report the wrong root type.
pub fn omit_absent(raw: &Value) -> Value {
    match raw {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| {
                    let v = match v {
                        Value::Object(inner) => Value::Object(drop_nulls(inner)),
                        other => other.clone(),
                    };
                    (k.clone(), v)
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

fn drop_nulls(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Declarative decoration, as written in plugin files.
///
/// ```yaml
/// decorate:
///   trim: [username, email]
///   lowercase: [email]
///   defaults:
///     remember_me: false
/// ```
///
/// Field names may be dotted (`profile.first_name`) to reach one object
/// level down. Steps run in order: absent fields are omitted, strings are
/// trimmed then lowercased, and defaults fill fields that are still missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Decoration {
    #[serde(default)]
    pub defaults: Map<String, Value>,
    #[serde(default)]
    pub trim: Vec<String>,
    #[serde(default)]
    pub lowercase: Vec<String>,
}

impl Decoration {
    /// Fields to trim.
    pub fn trim<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trim.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Fields to lowercase.
    pub fn lowercase<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lowercase.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Default for a missing top-level field.
    pub fn default_value(mut self, field: impl Into<String>, value: Value) -> Self {
        self.defaults.insert(field.into(), value);
        self
    }

    /// Decorate a raw payload.
    pub fn apply(&self, raw: &Value) -> Value {
        let mut candidate = omit_absent(raw);
        if let Value::Object(map) = &mut candidate {
            for field in &self.trim {
                map_string(map, field, |s| s.trim().to_string());
            }
            for field in &self.lowercase {
                map_string(map, field, str::to_lowercase);
            }
            for (field, value) in &self.defaults {
                map.entry(field.clone()).or_insert_with(|| value.clone());
            }
        }
        candidate
    }
}

/// Apply `f` to the string at a dotted path. Anything else is left alone.
fn map_string(map: &mut Map<String, Value>, path: &str, f: impl Fn(&str) -> String) {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    match (map.get_mut(head), rest) {
        (Some(Value::String(s)), None) => *s = f(s),
        (Some(Value::Object(inner)), Some(rest)) => map_string(inner, rest, f),
        _ => {}
    }
}
