//! # gatehouse-plugins: Schema Providers, Registry & Pipeline
//!
//! Organizes validation rulesets into a two-level namespace and runs
//! request payloads through them.
//!
//! ## Components
//!
//! - [`provider`]: the Schema Provider contract, a schema plus a pure
//!   decoration function for one `(resource, subtype)` pair.
//! - [`layout`] / [`source`]: directory-shaped plugin trees, built in code
//!   or read from declarative files on disk.
//! - [`registry`]: builds the immutable `resource → subtype → provider`
//!   tree once at startup, admitting only complete providers.
//! - [`resolver`]: selects a provider by explicit subtype, then `default`,
//!   then the first registered entry.
//! - [`pipeline`]: resolve, decorate, validate; returns a
//!   [`ValidationOutcome`].
//! - [`builtin`]: the `Users` providers (`signup`, `login`, `update`).
//!
//! ## Data Flow
//!
//! ```text
//! caller → ValidationPipeline → PluginResolver → PluginRegistry (read)
//!        → SchemaProvider::decorate → ValidationSchema::validate → outcome
//! ```
//!
//! ## Crate Policy
//!
//! - The registry is never mutated after construction; share it in an `Arc`.
//! - Resolver failures are configuration defects and propagate as
//!   [`PluginError`]; schema violations are a normal [`ValidationOutcome`].

pub mod builtin;
pub mod decorate;
pub mod layout;
pub mod pipeline;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod source;

pub use decorate::{omit_absent, Decoration};
pub use layout::{PluginDir, PluginFile, PluginLayout, PluginNode};
pub use pipeline::{
    ErrorResponse, FieldDetail, PipelineConfig, ValidateOptions, ValidationOutcome,
    ValidationPipeline,
};
pub use provider::{Plugin, PluginExports, SchemaProvider};
pub use registry::{PluginRegistry, RegistryError, Rejection};
pub use resolver::{PluginError, PluginResolver, DEFAULT_SUBTYPE};
pub use source::PluginDirectory;
