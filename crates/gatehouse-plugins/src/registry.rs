//! The plugin registry: an immutable `resource → subtype → provider` tree.
//!
//! Built once at startup from a [`PluginLayout`]. Every directory becomes a
//! resource group, even an empty one. Every file inside a directory is
//! admitted as a provider only if it exports both a schema and a
//! decoration and the schema compiles; rejected files are logged and
//! recorded as [`Rejection`]s but never enter the tree.
//!
//! Groups and subtypes keep the order they were loaded in. The resolver's
//! "first registered subtype" fallback depends on it.

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;

use crate::layout::{PluginDir, PluginLayout, PluginNode};
use crate::provider::SchemaProvider;
use crate::source::PluginDirectory;

/// Subtypes of one resource, in load order.
pub(crate) type Group = IndexMap<String, Arc<SchemaProvider>>;

/// Fatal plugin loading failures.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The plugin root directory cannot be listed.
    #[error("cannot read plugin root {path}: {source}")]
    RootUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A plugin file that was not admitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub resource: String,
    pub subtype: String,
    pub origin: String,
    pub reason: String,
}

/// The loaded plugin tree.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    groups: IndexMap<String, Group>,
    rejections: Vec<Rejection>,
}

impl PluginRegistry {
    /// Build the registry from a layout.
    pub fn load(layout: &PluginLayout) -> Self {
        let mut registry = Self::default();
        for node in layout.nodes() {
            match node {
                PluginNode::Dir(dir) => registry.admit_dir(dir.name(), dir),
                PluginNode::File(file) => {
                    tracing::debug!(
                        file = %file.origin(),
                        "ignoring plugin file outside any resource"
                    );
                }
            }
        }

        tracing::info!(
            resources = registry.groups.len(),
            providers = registry.provider_count(),
            rejected = registry.rejections.len(),
            "plugin registry loaded"
        );
        registry
    }

    /// Read `root` from disk and build the registry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::RootUnreadable`] if `root` cannot be listed.
    pub fn load_dir(root: &Path) -> Result<Self, RegistryError> {
        let layout = PluginDirectory::new(root).read()?;
        Ok(Self::load(&layout))
    }

    fn admit_dir(&mut self, key: &str, dir: &PluginDir) {
        self.groups.entry(key.to_string()).or_default();

        for node in dir.nodes() {
            match node {
                PluginNode::File(file) => {
                    let subtype = file.subtype().to_string();
                    match file.exports().admit(key, &subtype) {
                        Ok(provider) => {
                            let group = self.groups.entry(key.to_string()).or_default();
                            if group.insert(subtype.clone(), Arc::new(provider)).is_some() {
                                tracing::warn!(
                                    resource = key,
                                    subtype = %subtype,
                                    file = %file.origin(),
                                    "plugin overrides an earlier registration"
                                );
                            }
                        }
                        Err(e) => {
                            tracing::warn!(file = %file.origin(), error = %e, "plugin rejected");
                            self.rejections.push(Rejection {
                                resource: key.to_string(),
                                subtype,
                                origin: file.origin().to_string(),
                                reason: e.to_string(),
                            });
                        }
                    }
                }
                PluginNode::Dir(sub) => {
                    let sub_key = format!("{key}.{}", sub.name());
                    self.admit_dir(&sub_key, sub);
                }
            }
        }
    }

    pub(crate) fn group(&self, resource: &str) -> Option<&Group> {
        self.groups.get(resource)
    }

    /// Resource keys in load order.
    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Subtypes registered under `resource`, in load order.
    pub fn subtypes(&self, resource: &str) -> Option<Vec<&str>> {
        self.groups
            .get(resource)
            .map(|group| group.keys().map(String::as_str).collect())
    }

    /// Files that were not admitted.
    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    /// Admitted providers across all resources.
    pub fn provider_count(&self) -> usize {
        self.groups.values().map(IndexMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::PluginExports;
    use serde_json::{json, Value};

    fn complete() -> PluginExports {
        PluginExports::new()
            .schema(|| json!({ "type": "object" }))
            .decorate(Value::clone)
    }

    #[test]
    fn directories_become_groups_and_nested_keys_are_dotted() {
        let layout = PluginLayout::new().dir("Users", |users| {
            users
                .file("signup", complete())
                .dir("Admin", |admin| admin.file("create", complete()))
        });
        let registry = PluginRegistry::load(&layout);
        assert_eq!(registry.resources().collect::<Vec<_>>(), vec!["Users", "Users.Admin"]);
        assert_eq!(registry.subtypes("Users").unwrap(), vec!["signup"]);
        assert_eq!(registry.subtypes("Users.Admin").unwrap(), vec!["create"]);
    }

    #[test]
    fn incomplete_exports_are_rejected_and_recorded() {
        let layout = PluginLayout::new().dir("Users", |users| {
            users
                .file("signup", complete())
                .file("broken", PluginExports::new().schema(|| json!({})))
        });
        let registry = PluginRegistry::load(&layout);
        assert_eq!(registry.subtypes("Users").unwrap(), vec!["signup"]);
        assert_eq!(registry.rejections().len(), 1);
        assert_eq!(registry.rejections()[0].subtype, "broken");
        assert!(registry.rejections()[0].reason.contains("missing decorate"));
    }

    #[test]
    fn empty_directory_creates_empty_group() {
        let registry = PluginRegistry::load(&PluginLayout::new().dir("Empty", |d| d));
        assert_eq!(registry.subtypes("Empty").unwrap(), Vec::<&str>::new());
        assert_eq!(registry.provider_count(), 0);
    }

    #[test]
    fn root_files_are_ignored() {
        let layout = PluginLayout::new()
            .with_file(crate::layout::PluginFile::new("stray.json", complete()));
        let registry = PluginRegistry::load(&layout);
        assert_eq!(registry.resources().count(), 0);
    }

    #[test]
    fn later_layout_overrides_earlier_registration() {
        let first = PluginLayout::new().dir("Users", |d| {
            d.file("signup", complete()).file("login", complete())
        });
        let second = PluginLayout::new().dir("Users", |d| d.file("signup", complete()));
        let registry = PluginRegistry::load(&first.merge(second));
        assert_eq!(registry.subtypes("Users").unwrap(), vec!["signup", "login"]);
        assert_eq!(registry.provider_count(), 2);
    }
}
