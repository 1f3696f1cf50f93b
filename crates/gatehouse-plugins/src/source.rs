//! Plugin trees read from a directory on disk.
//!
//! Each plugin file is a JSON or YAML document with two members:
//!
//! ```yaml
//! schema:
//!   type: object
//!   required: [email]
//!   properties:
//!     email: { type: string }
//! decorate:
//!   trim: [email]
//!   lowercase: [email]
//! ```
//!
//! A file missing either member is still read; the registry rejects it at
//! admission. Unreadable or unparseable files are skipped with a warning.
//! Entries are visited in name order so loading is deterministic.
//! Symlinks are never followed into directories.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::decorate::Decoration;
use crate::layout::{PluginDir, PluginFile, PluginLayout};
use crate::provider::PluginExports;
use crate::registry::RegistryError;

/// A plugin root directory.
#[derive(Debug, Clone)]
pub struct PluginDirectory {
    root: PathBuf,
}

impl PluginDirectory {
    /// A plugin root at `root`. Nothing is read until [`read`](Self::read).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read the directory into a layout.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::RootUnreadable`] if the root itself cannot
    /// be listed. Problems below the root are logged and skipped.
    pub fn read(&self) -> Result<PluginLayout, RegistryError> {
        let entries = sorted_entries(&self.root).map_err(|e| RegistryError::RootUnreadable {
            path: self.root.display().to_string(),
            source: e,
        })?;

        let mut layout = PluginLayout::new();
        for path in entries {
            if is_plain_dir(&path) {
                layout = layout.with_dir(read_dir(&path));
            } else {
                tracing::debug!(file = %path.display(), "ignoring file at plugin root");
            }
        }
        Ok(layout)
    }
}

fn read_dir(path: &Path) -> PluginDir {
    let mut dir = PluginDir::new(entry_name(path));
    let entries = match sorted_entries(path) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %path.display(), error = %e, "cannot list plugin directory");
            return dir;
        }
    };

    for entry in entries {
        if is_plain_dir(&entry) {
            dir = dir.with_dir(read_dir(&entry));
        } else if let Some(file) = read_file(&entry) {
            dir = dir.with_file(file);
        }
    }
    dir
}

fn read_file(path: &Path) -> Option<PluginFile> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !matches!(extension, "json" | "yaml" | "yml") {
        tracing::debug!(file = %path.display(), "ignoring non-plugin file");
        return None;
    }

    let document = match parse_document(path, extension) {
        Ok(document) => document,
        Err(reason) => {
            tracing::warn!(file = %path.display(), %reason, "skipping unreadable plugin file");
            return None;
        }
    };

    Some(
        PluginFile::new(entry_name(path), exports_from(path, &document))
            .with_origin(path.display().to_string()),
    )
}

fn parse_document(path: &Path, extension: &str) -> Result<Value, String> {
    let content = fs::read_to_string(path).map_err(|e| format!("cannot read file: {e}"))?;
    match extension {
        "yaml" | "yml" => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(&content).map_err(|e| format!("invalid YAML: {e}"))?;
            yaml_to_json_value(&yaml).map_err(|e| format!("YAML-to-JSON conversion failed: {e}"))
        }
        _ => serde_json::from_str(&content).map_err(|e| format!("invalid JSON: {e}")),
    }
}

/// Exports for whichever of `schema` and `decorate` the document carries.
fn exports_from(path: &Path, document: &Value) -> PluginExports {
    let mut exports = PluginExports::new();

    if let Some(schema) = document.get("schema") {
        let schema = schema.clone();
        exports = exports.schema(move || schema.clone());
    }

    if let Some(decorate) = document.get("decorate") {
        match serde_json::from_value::<Decoration>(decorate.clone()) {
            Ok(decoration) => exports = exports.decorate(move |raw| decoration.apply(raw)),
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "invalid decorate section");
            }
        }
    }

    exports
}

fn sorted_entries(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

/// A directory that is not reached through a symlink.
fn is_plain_dir(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Plugin files use only the JSON-compatible subset of YAML. Tags are
/// dropped and their inner value converted.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut object = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key: {other:?}")),
                };
                object.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(object))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
