//! # Draft 4 Conformance Checking — Engine Seam
//!
//! The two capabilities the rule engine needs from a JSON Schema engine:
//! validating a document against the Draft 4 meta-schema, and compiling a
//! document as its own schema while refusing every network or filesystem
//! fetch. Both are expressed through the [`ConformanceChecker`] trait so the
//! engine behind them stays replaceable (and instrumentable in tests).
//!
//! ## Security Invariant
//!
//! No retrieval of any external resource may ever happen while checking an
//! untrusted document. [`Draft4Checker`] installs a retriever that refuses
//! every URI on every call; the refusal is not durable engine configuration,
//! it is re-applied each time a validator is built.
//!
//! ## Reference Resolution
//!
//! Internal `#/...` pointers are resolved by the `jsonschema` crate natively
//! and never reach the retriever. Anything else (absolute URIs, relative
//! file paths, custom `$schema` URIs) is a fault, reported through a
//! dedicated [`CheckerError`] variant so the caller can categorize it.

use jsonschema::{Draft, Retrieve, Uri, ValidationOptions};
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;

/// Official JSON Schema Draft 4 meta-schema, embedded so conformance
/// checking never touches the network or filesystem.
const DRAFT4_META_SCHEMA: &str = include_str!("../schemas/draft-04.schema.json");

/// `$schema` URIs accepted as declaring the Draft 4 dialect.
const DRAFT4_SCHEMA_URIS: [&str; 2] = [
    "http://json-schema.org/draft-04/schema#",
    "http://json-schema.org/draft-04/schema",
];

/// Marker embedded in every refused retrieval, so compile failures caused by
/// the refusal are distinguishable from other engine faults.
const REFUSAL_MARKER: &str = "refused to fetch external reference";

/// Fault channel of a [`ConformanceChecker`].
///
/// Data-vs-schema validation outcomes are never reported here; only
/// structural and reference faults are. The split matters: a failure of
/// sample data against the candidate schema is expected and ignorable, a
/// reference leaving the document is not.
#[derive(Error, Debug)]
pub enum CheckerError {
    /// The document declared a meta schema other than Draft 4.
    #[error("{0}")]
    CustomMetaSchema(String),

    /// The document referenced a resource outside itself.
    #[error("{0}")]
    ExternalReference(String),

    /// The underlying engine failed in an unexpected way.
    #[error("{0}")]
    Engine(String),
}

/// The replaceable JSON Schema engine seam.
pub trait ConformanceChecker {
    /// Validate `document` against the official Draft 4 meta-schema, with
    /// all fetching disabled. Returns one detail string per grammar
    /// violation, in the order the engine reports them.
    fn conforms_to_meta_schema(&self, document: &Value) -> Result<Vec<String>, CheckerError>;

    /// Compile `document` as its own schema, resolving same-document `#/...`
    /// pointers only. Succeeds when every reference stays inside the
    /// document; how actual data would fare against the schema is not this
    /// capability's concern.
    fn self_validate_no_fetch(&self, document: &Value) -> Result<(), CheckerError>;
}

/// Production checker backed by the `jsonschema` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Draft4Checker;

/// Retriever that refuses every URI, with the URI named in the refusal.
struct RefusingRetriever;

impl Retrieve for RefusingRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("{REFUSAL_MARKER}: {uri}").into())
    }
}

/// Parse the embedded meta-schema once; shared read-only across all checks.
fn draft4_meta_schema() -> Result<&'static Value, CheckerError> {
    static META: OnceLock<Result<Value, String>> = OnceLock::new();
    META.get_or_init(|| serde_json::from_str(DRAFT4_META_SCHEMA).map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|e| CheckerError::Engine(e.clone()))
}

/// Fresh validator options with Draft 4 semantics and fetching refused.
fn no_fetch_options() -> ValidationOptions {
    let mut opts = jsonschema::options();
    opts.with_draft(Draft::Draft4);
    opts.with_retriever(RefusingRetriever);
    opts
}

/// Whether a compile failure came from reference resolution rather than some
/// other engine fault. The `jsonschema` crate reports both through one build
/// error channel; refusals carry our marker, and the crate's own resolution
/// failures name the retrieval or reference that failed.
fn is_reference_fault(detail: &str) -> bool {
    detail.contains(REFUSAL_MARKER)
        || detail.contains("retriev")
        || detail.contains("resolv")
        || detail.contains("reference")
}

impl ConformanceChecker for Draft4Checker {
    fn conforms_to_meta_schema(&self, document: &Value) -> Result<Vec<String>, CheckerError> {
        let meta = draft4_meta_schema()?;
        let validator = no_fetch_options()
            .build(meta)
            .map_err(|e| CheckerError::Engine(e.to_string()))?;
        Ok(validator
            .iter_errors(document)
            .map(|err| {
                let location = err.instance_path.to_string();
                if location.is_empty() {
                    err.to_string()
                } else {
                    format!("{err} at {location}")
                }
            })
            .collect())
    }

    fn self_validate_no_fetch(&self, document: &Value) -> Result<(), CheckerError> {
        if let Some(declared) = document.get("$schema") {
            let accepted = declared
                .as_str()
                .is_some_and(|uri| DRAFT4_SCHEMA_URIS.contains(&uri));
            if !accepted {
                return Err(CheckerError::CustomMetaSchema(declared.to_string()));
            }
        }

        // Compilation resolves every `$ref` through the retriever, so any
        // reference leaving the document surfaces here. A schema that
        // compiles can never fetch anything later.
        match no_fetch_options().build(document) {
            Ok(_) => Ok(()),
            Err(err) => {
                let detail = err.to_string();
                if is_reference_fault(&detail) {
                    Err(CheckerError::ExternalReference(detail))
                } else {
                    Err(CheckerError::Engine(detail))
                }
            }
        }
    }
}
