//! # Catalog Schema Extraction
//!
//! Locates the up-to-three recognized parameter schemas inside a broker
//! catalog's `schemas` value and delegates each one to the rule engine.
//! Traversal is pure data navigation: an absent or `null` value at any level
//! means "no schema declared" and is not an error, while a present value of
//! the wrong structural type is rejected with a *shape* error. A shape
//! failure on a shared branch (`service_instance`) is reported once, not
//! once per fragment below it.

use crate::error::{SchemaPath, ValidationError, ValidationErrorCollection};
use crate::schema::ParameterSchema;
use serde_json::Value;
use tracing::debug;

const SERVICE_INSTANCE_KEY: &str = "service_instance";
const SERVICE_BINDING_KEY: &str = "service_binding";
const CREATE_FRAGMENT: [&str; 2] = ["create", "parameters"];
const UPDATE_FRAGMENT: [&str; 2] = ["update", "parameters"];

/// The validated schema set of one broker catalog entry.
///
/// Holds one [`ParameterSchema`] per fragment that was present and
/// well-shaped, plus the aggregate error collection across extraction and
/// all constructed validators. Fragments validate independently; an invalid
/// fragment never stops its siblings from being evaluated.
#[derive(Debug, Default)]
pub struct CatalogSchemas {
    create_instance: Option<ParameterSchema>,
    update_instance: Option<ParameterSchema>,
    create_binding: Option<ParameterSchema>,
    errors: ValidationErrorCollection,
}

impl CatalogSchemas {
    /// Extract and validate the recognized parameter schemas from a decoded
    /// catalog `schemas` value.
    ///
    /// `None` and JSON `null` both mean "no schemas declared" and produce an
    /// empty, valid set.
    pub fn new(schemas: Option<&Value>) -> Self {
        let mut set = Self::default();

        let root = match schemas {
            None | Some(Value::Null) => return set,
            Some(root) => root,
        };
        if !root.is_object() {
            set.errors
                .add(ValidationError::not_a_hash(&SchemaPath::root(), root));
            return set;
        }

        if let Some(instance) = set.branch(root, SERVICE_INSTANCE_KEY) {
            set.create_instance =
                set.fragment(instance, SERVICE_INSTANCE_KEY, &CREATE_FRAGMENT);
            set.update_instance =
                set.fragment(instance, SERVICE_INSTANCE_KEY, &UPDATE_FRAGMENT);
        }
        if let Some(binding) = set.branch(root, SERVICE_BINDING_KEY) {
            set.create_binding = set.fragment(binding, SERVICE_BINDING_KEY, &CREATE_FRAGMENT);
        }

        debug!(
            valid = set.is_valid(),
            errors = set.errors.len(),
            "extracted catalog schemas"
        );
        set
    }

    /// True iff no extraction error occurred and every constructed validator
    /// passed.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Aggregate errors, in traversal and rule-execution order.
    pub fn errors(&self) -> &ValidationErrorCollection {
        &self.errors
    }

    /// The instance-create parameters schema, if one was present.
    pub fn create_instance(&self) -> Option<&ParameterSchema> {
        self.create_instance.as_ref()
    }

    /// The instance-update parameters schema, if one was present.
    pub fn update_instance(&self) -> Option<&ParameterSchema> {
        self.update_instance.as_ref()
    }

    /// The binding-create parameters schema, if one was present.
    pub fn create_binding(&self) -> Option<&ParameterSchema> {
        self.create_binding.as_ref()
    }

    /// Descend one shared top-level key.
    fn branch<'a>(&mut self, root: &'a Value, key: &str) -> Option<&'a Value> {
        self.descend(root, SchemaPath::root(), &[key])
            .map(|(value, _)| value)
    }

    /// Descend the remaining keys below a shared branch and, when a fragment
    /// is found, validate it and merge its errors into the aggregate.
    fn fragment(
        &mut self,
        branch: &Value,
        base: &str,
        keys: &[&str],
    ) -> Option<ParameterSchema> {
        let (value, path) = self.descend(branch, SchemaPath::from([base]), keys)?;
        let schema = ParameterSchema::new(value.clone(), path);
        self.errors.extend_from(schema.errors());
        Some(schema)
    }

    /// Walk `keys` below `node`, returning the value at the final key and
    /// its full path. Absent or `null` values stop the walk silently; a
    /// non-object value records a *shape* error and stops.
    fn descend<'a>(
        &mut self,
        mut node: &'a Value,
        mut path: SchemaPath,
        keys: &[&str],
    ) -> Option<(&'a Value, SchemaPath)> {
        for key in keys {
            path.push(*key);
            match node.get(key) {
                None | Some(Value::Null) => return None,
                Some(value) if !value.is_object() => {
                    self.errors.add(ValidationError::not_a_hash(&path, value));
                    return None;
                }
                Some(value) => node = value,
            }
        }
        Some((node, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use serde_json::json;

    fn valid_schema() -> Value {
        json!({
            "$schema": "http://json-schema.org/draft-04/schema#",
            "type": "object"
        })
    }

    #[test]
    fn test_absent_schemas_are_valid_and_empty() {
        for schemas in [None, Some(json!(null)), Some(json!({}))] {
            let set = CatalogSchemas::new(schemas.as_ref());
            assert!(set.is_valid());
            assert!(set.errors().is_empty());
            assert!(set.create_instance().is_none());
            assert!(set.update_instance().is_none());
            assert!(set.create_binding().is_none());
        }
    }

    #[test]
    fn test_null_or_empty_intermediate_values_are_not_errors() {
        for schemas in [
            json!({"service_instance": null}),
            json!({"service_instance": {}}),
            json!({"service_instance": {"create": null}}),
            json!({"service_instance": {"create": {}}}),
            json!({"service_instance": {"create": {"parameters": null}}}),
            json!({"service_binding": {"create": {}}}),
        ] {
            let set = CatalogSchemas::new(Some(&schemas));
            assert!(set.is_valid(), "schemas {schemas} produced {:?}", set.errors());
            assert!(set.create_instance().is_none());
        }
    }

    #[test]
    fn test_non_hash_root_is_a_shape_error() {
        let set = CatalogSchemas::new(Some(&json!(true)));
        assert!(!set.is_valid());
        assert_eq!(
            set.errors().messages(),
            vec!["Schemas must be a hash, but has value true"]
        );
        assert_eq!(set.errors().as_slice()[0].category, ErrorCategory::Shape);
    }

    #[test]
    fn test_non_hash_shared_branch_reports_one_error() {
        let set = CatalogSchemas::new(Some(&json!({"service_instance": true})));
        assert_eq!(
            set.errors().messages(),
            vec!["Schemas service_instance must be a hash, but has value true"]
        );
        assert!(set.create_instance().is_none());
        assert!(set.update_instance().is_none());
    }

    #[test]
    fn test_non_hash_intermediate_node() {
        let set = CatalogSchemas::new(Some(&json!({"service_instance": {"create": true}})));
        assert_eq!(
            set.errors().messages(),
            vec!["Schemas service_instance.create must be a hash, but has value true"]
        );
        assert!(set.create_instance().is_none());
    }

    #[test]
    fn test_non_hash_parameters_value_with_dangerous_uri() {
        let schemas = json!({
            "service_instance": {"create": {"parameters": "https://example.com/hax0r"}}
        });
        let set = CatalogSchemas::new(Some(&schemas));
        assert_eq!(
            set.errors().messages(),
            vec!["Schemas service_instance.create.parameters must be a hash, but has value \"https://example.com/hax0r\""]
        );
        assert!(set.create_instance().is_none());
    }

    #[test]
    fn test_create_instance_fragment_is_extracted_and_validated() {
        let schemas = json!({"service_instance": {"create": {"parameters": valid_schema()}}});
        let set = CatalogSchemas::new(Some(&schemas));
        assert!(set.is_valid());
        let schema = set.create_instance().unwrap();
        assert_eq!(schema.path().to_string(), "service_instance.create.parameters");
        assert_eq!(schema.document(), Some(&valid_schema()));
        assert!(set.update_instance().is_none());
        assert!(set.create_binding().is_none());
    }

    #[test]
    fn test_update_instance_fragment_is_extracted() {
        let schemas = json!({"service_instance": {"update": {"parameters": valid_schema()}}});
        let set = CatalogSchemas::new(Some(&schemas));
        assert!(set.is_valid());
        let schema = set.update_instance().unwrap();
        assert_eq!(schema.path().to_string(), "service_instance.update.parameters");
    }

    #[test]
    fn test_create_binding_fragment_is_extracted() {
        let schemas = json!({"service_binding": {"create": {"parameters": valid_schema()}}});
        let set = CatalogSchemas::new(Some(&schemas));
        assert!(set.is_valid());
        let schema = set.create_binding().unwrap();
        assert_eq!(schema.path().to_string(), "service_binding.create.parameters");
    }

    #[test]
    fn test_non_hash_binding_branch() {
        let set = CatalogSchemas::new(Some(&json!({"service_binding": true})));
        assert_eq!(
            set.errors().messages(),
            vec!["Schemas service_binding must be a hash, but has value true"]
        );
    }

    #[test]
    fn test_invalid_fragment_errors_flow_into_aggregate() {
        let schemas = json!({"service_instance": {"update": {"parameters": {}}}});
        let set = CatalogSchemas::new(Some(&schemas));
        assert!(!set.is_valid());
        assert_eq!(set.errors().len(), 1);
        let error = &set.errors().as_slice()[0];
        assert_eq!(error.category, ErrorCategory::TypeField);
        assert_eq!(error.path.to_string(), "service_instance.update.parameters");
        let schema = set.update_instance().unwrap();
        assert!(!schema.is_valid());
        assert_eq!(schema.errors(), set.errors());
    }

    #[test]
    fn test_sibling_fragments_validate_independently_in_order() {
        let schemas = json!({
            "service_instance": {
                "create": {"parameters": {"$ref": "http://example.com/ref"}},
                "update": {"parameters": true}
            },
            "service_binding": {"create": {"parameters": valid_schema()}}
        });
        let set = CatalogSchemas::new(Some(&schemas));
        let errors = set.errors().as_slice();
        assert_eq!(errors.len(), 2, "{errors:?}");
        assert_eq!(errors[0].category, ErrorCategory::ExternalReference);
        assert_eq!(
            errors[0].path.to_string(),
            "service_instance.create.parameters"
        );
        assert_eq!(errors[1].category, ErrorCategory::Shape);
        assert_eq!(
            errors[1].message,
            "Schemas service_instance.update.parameters must be a hash, but has value true"
        );
        assert!(set.create_binding().unwrap().is_valid());
    }
}
