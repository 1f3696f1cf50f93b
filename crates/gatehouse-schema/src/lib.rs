//! # gatehouse-schema: Payload Validation
//!
//! Compiles JSON Schema (Draft 2020-12) rulesets with the `jsonschema`
//! crate and validates request payloads against them with fixed semantics:
//!
//! - **Exhaustive**: every violation is reported, never just the first.
//! - **Reject unknown**: object schemas that declare `properties` reject
//!   keys they do not declare, unless they opt in with
//!   `additionalProperties: true`.
//! - **Strip**: the validated output only holds declared keys.
//! - **Coerce**: unambiguous strings are converted to the declared scalar
//!   type and missing properties receive their `default`.
//!
//! Violations are reported as [`gatehouse_core::Violation`]s with
//! human-readable messages (`"email" is required`), a machine-readable
//! type (`any.required`), the path to the offending attribute, and the
//! offending value.
//!
//! ## Message overrides
//!
//! A schema object may carry an `x-messages` map from keyword to message
//! suffix. A failing keyword listed there is reported as
//! `"<label>" <suffix>` instead of the generated message. The
//! [`fragments`] module uses this for email and ObjectId patterns.

mod coerce;
pub mod fragments;
mod report;
pub mod schema;
mod strip;

pub use schema::{SchemaError, ValidationSchema};
