//! # gatehouse-cli: Command-Line Interface
//!
//! Offline access to the same plugin registry and validation pipeline the
//! API serves.
//!
//! ## Subcommands
//!
//! - `plugins`: print the resource/subtype namespace and rejected files
//! - `validate`: run a payload through the pipeline and print the outcome
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers here take parsed args
//!   and explicit readers/writers so they can be tested.
//! - Handlers delegate to `gatehouse-plugins`; no validation logic here.

pub mod plugins;
pub mod validate;

use std::path::Path;

use anyhow::Context;
use gatehouse_plugins::{builtin, PluginDirectory, PluginRegistry};

/// Built-in providers, with `dir` merged over them when given.
pub fn load_registry(dir: Option<&Path>) -> anyhow::Result<PluginRegistry> {
    let mut layout = builtin::layout();
    if let Some(dir) = dir {
        let extra = PluginDirectory::new(dir)
            .read()
            .with_context(|| format!("loading plugins from {}", dir.display()))?;
        tracing::debug!(dir = %dir.display(), "merging plugin directory over built-ins");
        layout = layout.merge(extra);
    }

    let registry = PluginRegistry::load(&layout);
    tracing::debug!(
        with_dir = dir.is_some(),
        rejected = registry.rejections().len(),
        "plugin namespace ready"
    );
    Ok(registry)
}
