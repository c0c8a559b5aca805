//! Structural validation of values against a [`FieldSchema`].
//!
//! Validation walks a [`Value`] alongside its schema and reports every
//! mismatch as a [`Diagnostic`] carrying the dotted path of the offending
//! field. `Nil` is accepted in any position, and an `Immutable` value is
//! checked by its wrapped value.
//!
//! # Example
//!
//! ```
//! use athanor_sdk::schema::{FieldSchema, StructSchema};
//! use athanor_sdk::validation::validate;
//! use athanor_sdk::value::Value;
//!
//! let schema: FieldSchema = StructSchema::new("config")
//!     .with_field("name", FieldSchema::String)
//!     .with_field("versioned", FieldSchema::Bool)
//!     .into();
//!
//! let config = Value::map([("name", Value::from("x")), ("versioned", Value::from(true))]);
//! assert!(validate(&schema, &config).is_empty());
//!
//! let config = Value::map([("name", Value::from(true)), ("versioned", Value::from(true))]);
//! let diagnostics = validate(&schema, &config);
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].attribute, Some("name".to_string()));
//! ```

use std::collections::BTreeMap;

use crate::error::ProviderError;
use crate::schema::{Diagnostic, FieldSchema, ResourceSchema, StructSchema};
use crate::value::Value;

/// Validate a value against a field schema.
///
/// Returns every problem found. An empty list means the value is valid.
pub fn validate(schema: &FieldSchema, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    validate_field(schema, value, "", &mut diagnostics);
    diagnostics
}

/// Validate a value, folding any diagnostics into a [`ProviderError::Validation`].
pub fn validate_result(schema: &FieldSchema, value: &Value) -> Result<(), ProviderError> {
    let diagnostics = validate(schema, value);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(ProviderError::Validation(diagnostics))
    }
}

/// Check if a value is valid against a schema.
pub fn is_valid(schema: &FieldSchema, value: &Value) -> bool {
    validate(schema, value).is_empty()
}

/// Validate the identifier value and config of a create or update request.
///
/// Paths are prefixed with `identifier` and `config`.
pub fn validate_resource(
    schema: &ResourceSchema,
    identifier: &Value,
    config: &Value,
) -> Result<(), ProviderError> {
    let mut diagnostics = Vec::new();
    validate_field(&schema.identifier, identifier, "identifier", &mut diagnostics);
    validate_field(&schema.config, config, "config", &mut diagnostics);

    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(ProviderError::Validation(diagnostics))
    }
}

fn validate_field(
    schema: &FieldSchema,
    value: &Value,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let value = value.inner();
    if value.is_nil() {
        return;
    }

    match (schema, value) {
        (FieldSchema::String, Value::String(_))
        | (FieldSchema::Bool, Value::Bool(_))
        | (FieldSchema::File, Value::File(_))
        | (FieldSchema::Identifier, Value::Identifier(_)) => {},
        (FieldSchema::Map { value: value_schema }, Value::Map(entries)) => {
            for (key, entry) in entries {
                validate_field(value_schema, entry, &join_path(path, key), diagnostics);
            }
        },
        (FieldSchema::List { element }, Value::List(elements)) => {
            for (i, entry) in elements.iter().enumerate() {
                validate_field(element, entry, &join_path(path, &i.to_string()), diagnostics);
            }
        },
        (FieldSchema::Struct(schema), Value::Map(entries)) => {
            validate_struct(schema, entries, path, diagnostics);
        },
        (schema, value) => diagnostics.push(type_error(path, schema, value)),
    }
}

fn validate_struct(
    schema: &StructSchema,
    entries: &BTreeMap<String, Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for (name, field) in &schema.fields {
        let field_path = join_path(path, name);
        match entries.get(name) {
            Some(value) => validate_field(field, value, &field_path, diagnostics),
            None => diagnostics.push(
                Diagnostic::error(format!("Missing field '{}'", field_path))
                    .with_detail(format!("Struct '{}' requires this field", schema.name))
                    .with_attribute(field_path),
            ),
        }
    }

    for name in entries.keys().filter(|k| !schema.fields.contains_key(*k)) {
        let field_path = join_path(path, name);
        diagnostics.push(
            Diagnostic::error(format!("Unknown field '{}'", field_path))
                .with_detail(format!("Struct '{}' has no such field", schema.name))
                .with_attribute(field_path),
        );
    }
}

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}

fn type_error(path: &str, expected: &FieldSchema, got: &Value) -> Diagnostic {
    let diagnostic = Diagnostic::error(format!("Invalid type for field '{}'", path))
        .with_detail(format!("Expected {}, got {}", expected.type_name(), got.kind()));
    if path.is_empty() {
        diagnostic
    } else {
        diagnostic.with_attribute(path)
    }
}
