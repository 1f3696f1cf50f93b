//! Provider resolution.
//!
//! Selection order for `(resource, subtype)`:
//!
//! 1. the explicitly requested subtype, if registered;
//! 2. otherwise the `default` subtype, if registered;
//! 3. otherwise the first subtype registered under the resource.
//!
//! An unknown resource and a resource with no providers are errors. An
//! unknown subtype is not: it falls through to rule 2.

use std::sync::Arc;

use gatehouse_core::RequestError;
use thiserror::Error;

use crate::provider::SchemaProvider;
use crate::registry::PluginRegistry;

/// Subtype chosen when none is requested.
pub const DEFAULT_SUBTYPE: &str = "default";

/// Plugin configuration defects.
///
/// These indicate a broken deployment, not a bad request, and surface to
/// clients as internal errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PluginError {
    /// No resource group with this key.
    #[error("resource key not found: \"{resource}\"")]
    NotFound { resource: String },

    /// The resource group exists but holds no providers.
    #[error("no plugins registered for resource \"{resource}\"")]
    EmptyGroup { resource: String },

    /// A plugin module lacks a schema or decoration, or its schema does not
    /// compile. Raised at admission; such modules never reach the resolver.
    #[error("invalid plugin structure for \"{resource}\" subtype \"{subtype}\": {reason}")]
    InvalidPlugin {
        resource: String,
        subtype: String,
        reason: String,
    },
}

impl From<PluginError> for RequestError {
    fn from(err: PluginError) -> Self {
        RequestError::infrastructure(err)
    }
}

/// Selects providers from a shared registry.
#[derive(Debug, Clone)]
pub struct PluginResolver {
    registry: Arc<PluginRegistry>,
}

impl PluginResolver {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Resolve the provider for `resource`, preferring `subtype`.
    ///
    /// # Errors
    ///
    /// [`PluginError::NotFound`] for an unknown resource,
    /// [`PluginError::EmptyGroup`] for a resource without providers.
    pub fn resolve(
        &self,
        resource: &str,
        subtype: Option<&str>,
    ) -> Result<Arc<SchemaProvider>, PluginError> {
        let group = self
            .registry
            .group(resource)
            .ok_or_else(|| PluginError::NotFound {
                resource: resource.to_string(),
            })?;

        if let Some(requested) = subtype {
            if let Some(provider) = group.get(requested) {
                return Ok(Arc::clone(provider));
            }
            tracing::debug!(
                resource,
                subtype = requested,
                "subtype not registered, using fallback"
            );
        }

        group
            .get(DEFAULT_SUBTYPE)
            .or_else(|| group.first().map(|(_, provider)| provider))
            .map(Arc::clone)
            .ok_or_else(|| PluginError::EmptyGroup {
                resource: resource.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PluginLayout;
    use crate::provider::PluginExports;
    use serde_json::{json, Value};

    fn provider() -> PluginExports {
        PluginExports::new()
            .schema(|| json!({ "type": "object" }))
            .decorate(Value::clone)
    }

    fn resolver(layout: PluginLayout) -> PluginResolver {
        PluginResolver::new(Arc::new(PluginRegistry::load(&layout)))
    }

    #[test]
    fn explicit_subtype_wins() {
        let r = resolver(PluginLayout::new().dir("Users", |d| {
            d.file("default", provider()).file("signup", provider())
        }));
        assert_eq!(r.resolve("Users", Some("signup")).unwrap().subtype(), "signup");
    }

    #[test]
    fn default_is_preferred_over_first_registered() {
        let r = resolver(PluginLayout::new().dir("R", |d| {
            d.file("p1", provider()).file("default", provider())
        }));
        assert_eq!(r.resolve("R", None).unwrap().subtype(), "default");
    }

    #[test]
    fn unknown_subtype_falls_back_to_first_without_default() {
        let r = resolver(PluginLayout::new().dir("R", |d| {
            d.file("p1", provider()).file("p2", provider())
        }));
        assert_eq!(r.resolve("R", Some("nope")).unwrap().subtype(), "p1");
        assert_eq!(r.resolve("R", None).unwrap().subtype(), "p1");
    }

    #[test]
    fn unknown_resource_is_not_found() {
        let r = resolver(PluginLayout::new());
        assert_eq!(
            r.resolve("Nope", None).unwrap_err(),
            PluginError::NotFound { resource: "Nope".into() }
        );
    }

    #[test]
    fn empty_group_is_an_error() {
        let r = resolver(PluginLayout::new().dir("Empty", |d| d));
        assert_eq!(
            r.resolve("Empty", Some("x")).unwrap_err(),
            PluginError::EmptyGroup { resource: "Empty".into() }
        );
    }

    #[test]
    fn nested_resources_resolve_by_dotted_key() {
        let r = resolver(PluginLayout::new().dir("Users", |d| {
            d.dir("Admin", |a| a.file("create", provider()))
        }));
        assert_eq!(r.resolve("Users.Admin", None).unwrap().resource(), "Users.Admin");
        assert!(matches!(r.resolve("Users", None), Err(PluginError::EmptyGroup { .. })));
    }

    #[test]
    fn plugin_errors_are_infrastructure_failures() {
        let err: RequestError = PluginError::NotFound { resource: "X".into() }.into();
        assert!(matches!(err, RequestError::Infrastructure(_)));
    }
}
