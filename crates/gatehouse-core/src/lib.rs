//! # gatehouse-core: Error Model & Normalization
//!
//! Foundational types shared by every gatehouse crate.
//!
//! ## Error Taxonomy
//!
//! Every failure that can reach a client is one of three explicitly
//! tagged kinds, collected in [`RequestError`]:
//!
//! - [`ValidationError`]: an exhaustive list of field [`Violation`]s
//!   produced by schema validation. Recoverable by the client.
//! - [`DomainError`]: an intentional business-rule rejection carrying
//!   its own HTTP status and payload ("user already exists", "not found").
//! - Infrastructure: anything else. Surfaced as a generic 500.
//!
//! ## Normalization
//!
//! [`ErrorNormalizer::normalize`] is the single convergence point that
//! turns a [`RequestError`] into a [`NormalizedError`] (`{code, payload}`).
//! No other component formats a client-facing error body.
//!
//! ## Crate Policy
//!
//! - No internal dependencies. Every other crate depends on this one.
//! - Infrastructure error details are logged, never returned to clients.

#![deny(missing_docs)]

pub mod error;
pub mod normalize;

pub use error::{strip_quotes, DomainError, RequestError, ValidationError, Violation};
pub use normalize::{ErrorNormalizer, NormalizedError, NormalizerConfig};
