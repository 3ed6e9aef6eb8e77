//! Compiled JSON Schemas for checking JSON-shaped data.
//!
//! Sources are ordinary JSON Schema documents. They are checked against the
//! meta-schema when compiled, so a broken project-type schema surfaces when
//! the configuration is built rather than when a project is validated.

use serde_json::Value;
use std::fmt::{self, Write as _};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// Errors raised while compiling a schema source.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid schema: {message}")]
    Invalid { message: String },
}

/// One place where data does not satisfy a schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {message}")]
pub struct SchemaViolation {
    /// Location in the checked value, e.g. `$.phases.design.status`.
    pub path: String,
    pub message: String,
}

/// A compiled schema together with the document it came from.
pub struct Schema {
    document: Value,
    validator: jsonschema::Validator,
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.document == other.document
    }
}

impl Schema {
    /// Compile a schema from its JSON source.
    pub fn compile(source: &str) -> Result<Self, SchemaError> {
        let document: Value = serde_json::from_str(source)?;
        Self::from_value(document)
    }

    pub fn from_value(document: Value) -> Result<Self, SchemaError> {
        let validator = jsonschema::validator_for(&document).map_err(|e| SchemaError::Invalid {
            message: e.to_string(),
        })?;
        Ok(Self {
            document,
            validator,
        })
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn is_valid(&self, value: &Value) -> bool {
        self.validator.is_valid(value)
    }

    /// Check `value`, accumulating every violation.
    pub fn check(&self, value: &Value) -> Validation<(), NonEmptyVec<SchemaViolation>> {
        super::accumulate(self.violations(value))
    }

    /// Check `value` and return the violations as a list.
    pub fn violations(&self, value: &Value) -> Vec<SchemaViolation> {
        self.validator
            .iter_errors(value)
            .map(|error| SchemaViolation {
                path: display_path(value, &error.instance_path().to_string()),
                message: error.to_string(),
            })
            .collect()
    }
}

/// Render a JSON pointer into `value` as `$.field[index].field`.
fn display_path(value: &Value, pointer: &str) -> String {
    let mut path = String::from("$");
    let mut node = Some(value);
    for raw in pointer.split('/').skip(1) {
        let segment = raw.replace("~1", "/").replace("~0", "~");
        node = match node {
            Some(Value::Array(items)) => {
                let _ = write!(path, "[{segment}]");
                segment.parse::<usize>().ok().and_then(|i| items.get(i))
            }
            Some(Value::Object(fields)) => {
                let _ = write!(path, ".{segment}");
                fields.get(&segment)
            }
            _ => {
                let _ = write!(path, ".{segment}");
                None
            }
        };
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const REVIEW_SCHEMA: &str = r#"{
        "type": "object",
        "properties": {
            "outcome": { "enum": ["approved", "rejected"] },
            "reviewer": { "type": "string", "minLength": 1 },
            "retries": { "type": "integer", "minimum": 0, "maximum": 5 }
        },
        "required": ["outcome"],
        "additionalProperties": false
    }"#;

    #[test]
    fn accepts_conforming_data() {
        let schema = Schema::compile(REVIEW_SCHEMA).unwrap();
        let result = schema.check(&json!({"outcome": "approved", "reviewer": "sam", "retries": 1}));
        assert!(result.is_success());
    }

    #[test]
    fn accumulates_every_violation() {
        let schema = Schema::compile(REVIEW_SCHEMA).unwrap();
        let result = schema.check(&json!({"reviewer": "", "retries": 9, "extra": true}));

        match result {
            Validation::Failure(errors) => {
                let paths: Vec<&str> = errors.iter().map(|v| v.path.as_str()).collect();
                // missing outcome and the extra field are reported on the object
                assert_eq!(errors.len(), 4);
                assert_eq!(paths.iter().filter(|p| **p == "$").count(), 2);
                assert!(paths.contains(&"$.reviewer"));
                assert!(paths.contains(&"$.retries"));
                assert!(errors.iter().any(|v| v.message.contains("outcome")));
                assert!(errors.iter().any(|v| v.message.contains("extra")));
            }
            Validation::Success(_) => panic!("expected violations"),
        }
    }

    #[test]
    fn reports_enum_mismatch() {
        let schema = Schema::compile(REVIEW_SCHEMA).unwrap();
        let violations = schema.violations(&json!({"outcome": "maybe"}));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "$.outcome");
    }

    #[test]
    fn integral_floats_count_as_integers() {
        let schema = Schema::compile(r#"{"properties": {"n": {"type": "integer"}}}"#).unwrap();
        assert!(schema.is_valid(&json!({"n": 3.0})));
        assert!(!schema.is_valid(&json!({"n": 3.5})));
    }

    #[test]
    fn full_keyword_set_compiles() {
        let schema = Schema::compile(
            r#"{
                "type": "object",
                "properties": {
                    "level": {"enum": [1, 2]},
                    "ticket": {"type": "string", "pattern": "^[A-Z]+-[0-9]+$"},
                    "owner": {"oneOf": [{"type": "string"}, {"type": "null"}]}
                }
            }"#,
        )
        .unwrap();

        assert!(schema.is_valid(&json!({"level": 2, "ticket": "OPS-12", "owner": null})));
        let violations = schema.violations(&json!({"level": 3, "ticket": "ops"}));
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn array_items_are_checked_with_indexed_paths() {
        let schema = Schema::compile(r#"{"type": "array", "items": {"type": "string", "minLength": 1}}"#)
            .unwrap();
        let violations = schema.violations(&json!(["ok", ""]));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "$[1]");
    }

    #[test]
    fn numeric_object_keys_stay_fields() {
        let schema = Schema::compile(
            r#"{"properties": {"10": {"type": "boolean"}}}"#,
        )
        .unwrap();
        let violations = schema.violations(&json!({"10": "yes"}));
        assert_eq!(violations[0].path, "$.10");
    }

    #[test]
    fn compile_rejects_invalid_schema() {
        assert!(matches!(
            Schema::compile(r#"{"type": "widget"}"#),
            Err(SchemaError::Invalid { .. })
        ));
    }

    #[test]
    fn compile_rejects_bad_json() {
        assert!(matches!(
            Schema::compile("{not json"),
            Err(SchemaError::Parse(_))
        ));
    }
}
