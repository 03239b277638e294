//! # Parameter Schema Rule Engine
//!
//! Decides whether one candidate JSON document is an acceptable restricted
//! Draft 4 object schema. The rules form an explicit ordered chain and every
//! rule is skipped once an earlier rule has recorded an error: a malformed
//! base document cannot be meaningfully meta-validated, and reference
//! resolution must never run before the size bound is confirmed.
//!
//! Rule order:
//!
//! 1. Serialized size within 64KB (inclusive).
//! 2. Conformance to the Draft 4 meta-schema (all violations together).
//! 3. Reference safety: no custom meta schema, no external references.
//! 4. Top-level `"type": "object"` declaration.

use crate::checker::{CheckerError, ConformanceChecker, Draft4Checker};
use crate::error::{ErrorCategory, SchemaPath, ValidationError, ValidationErrorCollection};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Inclusive upper bound on the serialized schema, in bytes.
pub const MAX_SCHEMA_SIZE: usize = 65_536;

/// One candidate parameters schema together with its validation verdict.
///
/// The rule chain runs once at construction; the instance is immutable
/// afterwards. The checker is generic so tests can observe or replace the
/// engine; production code uses [`ParameterSchema::new`] with the default
/// [`Draft4Checker`].
pub struct ParameterSchema<C: ConformanceChecker = Draft4Checker> {
    document: Value,
    path: SchemaPath,
    errors: ValidationErrorCollection,
    checker: C,
}

impl ParameterSchema {
    /// Validate `document`, labeled with the catalog `path` it came from.
    pub fn new(document: Value, path: SchemaPath) -> Self {
        Self::with_checker(document, path, Draft4Checker)
    }
}

impl<C: ConformanceChecker> ParameterSchema<C> {
    /// Validate with a caller-supplied conformance checker.
    pub fn with_checker(document: Value, path: SchemaPath, checker: C) -> Self {
        let mut schema = Self {
            document,
            path,
            errors: ValidationErrorCollection::new(),
            checker,
        };
        schema.run_rules();
        schema
    }

    /// True iff every rule passed.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &ValidationErrorCollection {
        &self.errors
    }

    pub fn path(&self) -> &SchemaPath {
        &self.path
    }

    /// The validated document, available only once every rule has passed.
    pub fn document(&self) -> Option<&Value> {
        self.is_valid().then_some(&self.document)
    }

    fn run_rules(&mut self) {
        let rules: [fn(&mut Self); 4] = [
            Self::check_size,
            Self::check_draft_conformance,
            Self::check_reference_safety,
            Self::check_type_field,
        ];
        for rule in rules {
            if !self.errors.is_empty() {
                break;
            }
            rule(self);
        }
        debug!(
            path = %self.path,
            errors = self.errors.len(),
            "validated parameters schema"
        );
    }

    fn add_error(&mut self, category: ErrorCategory, detail: impl fmt::Display) {
        self.errors
            .add(ValidationError::schema_invalid(category, &self.path, detail));
    }

    fn check_size(&mut self) {
        match serde_json::to_string(&self.document) {
            Ok(serialized) if serialized.len() > MAX_SCHEMA_SIZE => {
                self.add_error(ErrorCategory::Size, "Must not be larger than 64KB");
            }
            Ok(_) => {}
            Err(err) => self.add_error(ErrorCategory::Internal, err),
        }
    }

    fn check_draft_conformance(&mut self) {
        match self.checker.conforms_to_meta_schema(&self.document) {
            Ok(violations) => {
                for violation in violations {
                    self.add_error(
                        ErrorCategory::DraftConformance,
                        format!("Must conform to JSON Schema Draft 04: {violation}"),
                    );
                }
            }
            Err(err) => self.add_error(ErrorCategory::Internal, err),
        }
    }

    fn check_reference_safety(&mut self) {
        match self.checker.self_validate_no_fetch(&self.document) {
            Ok(()) => {}
            Err(CheckerError::CustomMetaSchema(detail)) => self.add_error(
                ErrorCategory::CustomMetaschema,
                format!("Custom meta schemas are not supported: {detail}"),
            ),
            Err(CheckerError::ExternalReference(detail)) => self.add_error(
                ErrorCategory::ExternalReference,
                format!("No external references are allowed: {detail}"),
            ),
            Err(err @ CheckerError::Engine(_)) => {
                self.add_error(ErrorCategory::Internal, err);
            }
        }
    }

    fn check_type_field(&mut self) {
        if self.document.get("type").and_then(Value::as_str) != Some("object") {
            self.add_error(
                ErrorCategory::TypeField,
                r#"must have field "type", with value "object""#,
            );
        }
    }
}

impl<C: ConformanceChecker> fmt::Debug for ParameterSchema<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterSchema")
            .field("path", &self.path)
            .field("document", &self.document)
            .field("errors", &self.errors)
            .finish()
    }
}
