//! # Schema Providers
//!
//! A provider pairs a validation ruleset with a decoration function for
//! one `(resource, subtype)`. Providers are built once at load time and are
//! shared read-only by every request.
//!
//! Plugin modules hand their parts to the registry as [`PluginExports`].
//! Either part may be missing; the registry only admits exports that carry
//! both and whose schema compiles (see [`PluginExports::admit`]).

use std::fmt;
use std::sync::Arc;

use gatehouse_schema::ValidationSchema;
use serde_json::Value;

use crate::resolver::PluginError;

/// Zero-argument schema producer.
pub type SchemaFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// Pure payload normalizer.
pub type DecorateFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// A typed plugin module.
///
/// `schema` must be deterministic and `decorate` must be pure: neither may
/// depend on request state or wall-clock time.
pub trait Plugin: Send + Sync + 'static {
    /// The JSON Schema ruleset for this operation.
    fn schema(&self) -> Value;

    /// Normalize a raw payload into the candidate handed to validation.
    fn decorate(&self, raw: &Value) -> Value;
}

/// The parts a plugin module exposes to the registry.
#[derive(Clone, Default)]
pub struct PluginExports {
    schema: Option<SchemaFn>,
    decorate: Option<DecorateFn>,
}

impl fmt::Debug for PluginExports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginExports")
            .field("schema", &self.schema.as_ref().map(|_| "fn"))
            .field("decorate", &self.decorate.as_ref().map(|_| "fn"))
            .finish()
    }
}

impl PluginExports {
    /// Exports with neither part set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the schema producer.
    pub fn schema(mut self, f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.schema = Some(Arc::new(f));
        self
    }

    /// Set the decoration function.
    pub fn decorate(mut self, f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        self.decorate = Some(Arc::new(f));
        self
    }

    /// Export both parts of a typed plugin.
    pub fn from_plugin<P: Plugin>(plugin: P) -> Self {
        let plugin = Arc::new(plugin);
        let for_schema = Arc::clone(&plugin);
        Self {
            schema: Some(Arc::new(move || for_schema.schema())),
            decorate: Some(Arc::new(move |raw: &Value| plugin.decorate(raw))),
        }
    }

    /// Returns true if a schema producer is set.
    pub fn has_schema(&self) -> bool {
        self.schema.is_some()
    }

    /// Returns true if a decoration function is set.
    pub fn has_decorate(&self) -> bool {
        self.decorate.is_some()
    }

    /// Build a provider from these exports.
    ///
    /// The schema producer is invoked exactly once, here.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidPlugin`] if either part is missing or
    /// the schema does not compile.
    pub fn admit(&self, resource: &str, subtype: &str) -> Result<SchemaProvider, PluginError> {
        let invalid = |reason: String| PluginError::InvalidPlugin {
            resource: resource.to_string(),
            subtype: subtype.to_string(),
            reason,
        };

        let (schema_fn, decorate) = match (&self.schema, &self.decorate) {
            (Some(s), Some(d)) => (s, d),
            (None, Some(_)) => return Err(invalid("missing schema".to_string())),
            (Some(_), None) => return Err(invalid("missing decorate".to_string())),
            (None, None) => return Err(invalid("missing schema and decorate".to_string())),
        };

        let schema = ValidationSchema::compile(schema_fn()).map_err(|e| invalid(e.to_string()))?;

        Ok(SchemaProvider {
            resource: resource.to_string(),
            subtype: subtype.to_string(),
            schema,
            decorate: Arc::clone(decorate),
        })
    }
}

/// An admitted provider: compiled schema plus decoration.
pub struct SchemaProvider {
    resource: String,
    subtype: String,
    schema: ValidationSchema,
    decorate: DecorateFn,
}

impl fmt::Debug for SchemaProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaProvider")
            .field("resource", &self.resource)
            .field("subtype", &self.subtype)
            .finish_non_exhaustive()
    }
}

impl SchemaProvider {
    /// Resource key this provider is registered under (`Users.Admin`).
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Operation subtype (`signup`).
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// The compiled validation ruleset.
    pub fn schema(&self) -> &ValidationSchema {
        &self.schema
    }

    /// Normalize a raw payload.
    pub fn decorate(&self, raw: &Value) -> Value {
        (self.decorate)(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    impl Plugin for Echo {
        fn schema(&self) -> Value {
            json!({ "type": "object", "properties": { "a": { "type": "string" } } })
        }

        fn decorate(&self, raw: &Value) -> Value {
            raw.clone()
        }
    }

    #[test]
    fn typed_plugin_exports_both_parts() {
        let exports = PluginExports::from_plugin(Echo);
        assert!(exports.has_schema());
        assert!(exports.has_decorate());
        let provider = exports.admit("Things", "echo").unwrap();
        assert_eq!(provider.resource(), "Things");
        assert_eq!(provider.subtype(), "echo");
        assert_eq!(provider.decorate(&json!({ "a": "x" })), json!({ "a": "x" }));
    }

    #[test]
    fn missing_decorate_is_rejected() {
        let exports = PluginExports::new().schema(|| json!({ "type": "object" }));
        let err = exports.admit("Users", "broken").unwrap_err();
        match err {
            PluginError::InvalidPlugin { reason, subtype, .. } => {
                assert_eq!(reason, "missing decorate");
                assert_eq!(subtype, "broken");
            }
            other => panic!("expected InvalidPlugin, got: {other}"),
        }
    }

    #[test]
    fn missing_schema_is_rejected() {
        let exports = PluginExports::new().decorate(|raw| raw.clone());
        assert!(matches!(
            exports.admit("Users", "x"),
            Err(PluginError::InvalidPlugin { .. })
        ));
    }

    #[test]
    fn uncompilable_schema_is_rejected() {
        let exports = PluginExports::new()
            .schema(|| json!("not a schema"))
            .decorate(|raw| raw.clone());
        let err = exports.admit("Users", "x").unwrap_err();
        assert!(err.to_string().contains("schema must be a JSON object"), "got: {err}");
    }
}
