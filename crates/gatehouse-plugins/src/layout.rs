//! Directory-shaped plugin trees.
//!
//! A [`PluginLayout`] mirrors a plugin root directory: top-level
//! directories become resources, nested directories become dotted
//! resources (`Users/Admin` is `Users.Admin`), and files inside a
//! directory become subtypes named after the file stem. Layouts can be
//! built in code or read from disk with [`PluginDirectory`].
//!
//! [`PluginDirectory`]: crate::source::PluginDirectory

use std::path::Path;

use crate::provider::PluginExports;

/// A node in a plugin tree.
#[derive(Debug, Clone)]
pub enum PluginNode {
    /// A directory: a resource, or a nested resource group.
    Dir(PluginDir),
    /// A plugin module: one subtype.
    File(PluginFile),
}

/// A plugin module: a named file and whatever parts it exports.
#[derive(Debug, Clone)]
pub struct PluginFile {
    name: String,
    origin: String,
    exports: PluginExports,
}

impl PluginFile {
    /// A file named `name` (extension included). The origin defaults to
    /// the name.
    pub fn new(name: impl Into<String>, exports: PluginExports) -> Self {
        let name = name.into();
        Self {
            origin: name.clone(),
            name,
            exports,
        }
    }

    /// Where the file came from, for diagnostics.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// File name, extension included.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Diagnostic origin, usually the full path.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Whatever schema and decoration the file exports.
    pub fn exports(&self) -> &PluginExports {
        &self.exports
    }

    /// Subtype name: the file name without its extension.
    pub fn subtype(&self) -> &str {
        Path::new(&self.name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.name)
    }
}

/// A named directory of plugin nodes.
#[derive(Debug, Clone)]
pub struct PluginDir {
    name: String,
    nodes: Vec<PluginNode>,
}

impl PluginDir {
    /// An empty directory.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
        }
    }

    /// Directory name. One segment of the dotted resource key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Child nodes in insertion order.
    pub fn nodes(&self) -> &[PluginNode] {
        &self.nodes
    }

    /// Add a plugin file.
    pub fn file(self, name: impl Into<String>, exports: PluginExports) -> Self {
        self.with_file(PluginFile::new(name, exports))
    }

    /// Add a nested directory built by `build`.
    pub fn dir(self, name: impl Into<String>, build: impl FnOnce(PluginDir) -> PluginDir) -> Self {
        self.with_dir(build(PluginDir::new(name)))
    }

    /// Append a file node.
    pub fn with_file(mut self, file: PluginFile) -> Self {
        self.nodes.push(PluginNode::File(file));
        self
    }

    /// Append a directory node.
    pub fn with_dir(mut self, dir: PluginDir) -> Self {
        self.nodes.push(PluginNode::Dir(dir));
        self
    }
}

/// The root of a plugin tree.
#[derive(Debug, Clone, Default)]
pub struct PluginLayout {
    nodes: Vec<PluginNode>,
}

impl PluginLayout {
    /// An empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level nodes in insertion order.
    pub fn nodes(&self) -> &[PluginNode] {
        &self.nodes
    }

    /// Add a resource directory built by `build`.
    pub fn dir(self, name: impl Into<String>, build: impl FnOnce(PluginDir) -> PluginDir) -> Self {
        self.with_dir(build(PluginDir::new(name)))
    }

    /// Append a resource directory.
    pub fn with_dir(mut self, dir: PluginDir) -> Self {
        self.nodes.push(PluginNode::Dir(dir));
        self
    }

    /// Add a file at the root. Root files are not part of any resource.
    pub fn with_file(mut self, file: PluginFile) -> Self {
        self.nodes.push(PluginNode::File(file));
        self
    }

    /// Append another layout. Entries of `other` are loaded after ours, so
    /// a repeated `(resource, subtype)` in `other` wins.
    pub fn merge(mut self, other: PluginLayout) -> Self {
        self.nodes.extend(other.nodes);
        self
    }
}
