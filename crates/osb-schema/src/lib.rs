//! # osb-schema — Catalog Parameter-Schema Validation
//!
//! Validates that the JSON Schema documents a service broker attaches to its
//! catalog (instance-create, instance-update, and binding-create parameters)
//! are safe to store, display, and later use against end-user input: each
//! must be a bounded-size JSON object conforming to a restricted dialect of
//! JSON Schema Draft 4 that never references anything outside itself.
//!
//! ## Key Design Principles
//!
//! 1. **All outcomes are data.** Rejections become entries in an ordered
//!    [`ValidationErrorCollection`]; nothing panics or escapes the component
//!    boundary. The caller renders errors into its own API envelope.
//!
//! 2. **Cheap and safe before expensive and dangerous.** The rule chain in
//!    [`ParameterSchema`] runs the 64KB size gate first and skips every later
//!    rule once any rule has failed, so untrusted documents bound the cost of
//!    meta-schema conformance and reference resolution.
//!
//! 3. **No fetches, ever.** The Draft 4 meta-schema is an embedded constant,
//!    and every schema compilation installs a retriever that refuses all
//!    URIs. Same-document `#/...` pointers are the only references allowed.
//!
//! 4. **Absence is not an error.** Catalog traversal in [`CatalogSchemas`]
//!    treats missing or `null` values as "no schema declared"; only a present
//!    value of the wrong structural type is rejected.
//!
//! ## Crate Policy
//!
//! - Synchronous and allocation-only: no I/O during validation.
//! - No `unsafe` code, no `panic!()` or `.unwrap()` outside tests.
//! - The schema engine sits behind the [`ConformanceChecker`] trait and is
//!   replaceable.

pub mod catalog;
pub mod checker;
pub mod error;
pub mod schema;

// Re-export primary types for ergonomic imports.
pub use catalog::CatalogSchemas;
pub use checker::{CheckerError, ConformanceChecker, Draft4Checker};
pub use error::{ErrorCategory, SchemaPath, ValidationError, ValidationErrorCollection};
pub use schema::{ParameterSchema, MAX_SCHEMA_SIZE};
