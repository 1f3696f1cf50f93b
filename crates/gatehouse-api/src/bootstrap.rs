//! # Startup Bootstrap
//!
//! Builds the plugin registry and the shared state from configuration:
//!
//! 1. Register the built-in providers.
//! 2. If `PLUGIN_DIR` is set, read it and merge it over the built-ins.
//! 3. Load the registry once and log what was admitted.

use gatehouse_plugins::{builtin, PluginDirectory, PluginRegistry, RegistryError};

use crate::config::AppConfig;
use crate::state::AppState;

/// Errors during bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The configured plugin directory could not be read.
    #[error("plugin loading failed: {0}")]
    Plugins(#[from] RegistryError),
}

/// Build the application state.
pub fn bootstrap(config: AppConfig) -> Result<AppState, BootstrapError> {
    let mut layout = builtin::layout();
    if let Some(dir) = &config.plugin_dir {
        tracing::info!(dir = %dir.display(), "loading plugins from directory");
        layout = layout.merge(PluginDirectory::new(dir).read()?);
    }

    let registry = PluginRegistry::load(&layout);
    for resource in registry.resources() {
        let subtypes = registry.subtypes(resource).unwrap_or_default();
        tracing::info!(resource, subtypes = ?subtypes, "resource registered");
    }
    for rejection in registry.rejections() {
        tracing::warn!(
            resource = %rejection.resource,
            subtype = %rejection.subtype,
            file = %rejection.origin,
            reason = %rejection.reason,
            "plugin not loaded"
        );
    }

    tracing::info!(environment = %config.environment, "bootstrap complete");
    Ok(AppState::with_registry(config, registry))
}
