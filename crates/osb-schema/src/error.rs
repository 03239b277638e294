//! # Validation Errors — Structured Rejection Reporting
//!
//! Every rejection a broker-supplied schema can earn is represented as data:
//! a machine-stable category tag, the catalog path the schema came from, and
//! a human-readable message that embeds that path. Errors are append-only and
//! ordered by the sequence in which checks ran; nothing in this crate raises
//! a validation outcome past the component boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Machine-stable tag identifying which rule rejected a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCategory {
    /// Wrong structural type at some catalog path.
    Shape,
    /// Serialized schema exceeds the size bound.
    Size,
    /// One meta-schema grammar violation.
    DraftConformance,
    /// A disallowed alternate meta schema was declared.
    CustomMetaschema,
    /// A reference points at a network or filesystem resource.
    ExternalReference,
    /// Missing or incorrect required `"type": "object"` declaration.
    TypeField,
    /// Unexpected failure inside the conformance engine.
    Internal,
}

impl ErrorCategory {
    /// Kebab-case tag, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Shape => "shape",
            ErrorCategory::Size => "size",
            ErrorCategory::DraftConformance => "draft-conformance",
            ErrorCategory::CustomMetaschema => "custom-metaschema",
            ErrorCategory::ExternalReference => "external-reference",
            ErrorCategory::TypeField => "type-field",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered key path locating a schema fragment inside the catalog document.
///
/// Used for error message formatting only; renders as dot-joined segments
/// (`service_instance.create.parameters`). The empty path denotes the catalog
/// `schemas` value itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaPath(Vec<String>);

impl SchemaPath {
    /// The empty path, denoting the root `schemas` value.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.0.push(segment.into());
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl<const N: usize> From<[&str; N]> for SchemaPath {
    fn from(segments: [&str; N]) -> Self {
        Self(segments.iter().map(|s| s.to_string()).collect())
    }
}

impl From<&[&str]> for SchemaPath {
    fn from(segments: &[&str]) -> Self {
        Self(segments.iter().map(|s| s.to_string()).collect())
    }
}

/// One rejection reason, ready to render into a broker-facing error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Which rule rejected the schema.
    pub category: ErrorCategory,
    /// Catalog path of the offending value.
    pub path: SchemaPath,
    /// Full message, including the rendered path.
    pub message: String,
}

impl ValidationError {
    pub fn new(category: ErrorCategory, path: SchemaPath, message: impl Into<String>) -> Self {
        Self {
            category,
            path,
            message: message.into(),
        }
    }

    /// Per-schema rule rejection: `Schema <path> is not valid. <detail>`.
    pub fn schema_invalid(
        category: ErrorCategory,
        path: &SchemaPath,
        detail: impl fmt::Display,
    ) -> Self {
        Self {
            category,
            path: path.clone(),
            message: format!("Schema {path} is not valid. {detail}"),
        }
    }

    /// Structural rejection during catalog traversal:
    /// `Schemas <path> must be a hash, but has value <literal>`.
    ///
    /// The root `schemas` value has an empty path and renders without one.
    pub fn not_a_hash(path: &SchemaPath, value: &Value) -> Self {
        let message = if path.is_root() {
            format!("Schemas must be a hash, but has value {value}")
        } else {
            format!("Schemas {path} must be a hash, but has value {value}")
        };
        Self {
            category: ErrorCategory::Shape,
            path: path.clone(),
            message,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Ordered, append-only collection of validation errors.
///
/// Owned by one validation run; `is_empty` defines the overall verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrorCollection(Vec<ValidationError>);

impl ValidationErrorCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// Append every error of `other`, preserving order.
    pub fn extend_from(&mut self, other: &Self) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ValidationError] {
        &self.0
    }

    /// The human-readable messages, in rule-execution order.
    pub fn messages(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.message.as_str()).collect()
    }
}

impl fmt::Display for ValidationErrorCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ValidationErrorCollection {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
