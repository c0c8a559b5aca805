//! Schema types describing the shape of a provider's resources.
//!
//! A [`Schema`] lists one [`ResourceSchema`] per resource type. Each resource
//! schema describes its identifier, config and attrs with a recursive
//! [`FieldSchema`]. Schemas are authored once per provider and consumed by
//! validation, the `GetSchema` RPC and code generators.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::generated;
use crate::generated::field_schema::Type as ProtoFieldType;

/// The shape of a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldSchema {
    /// A string value.
    String,
    /// A boolean value.
    Bool,
    /// A file reference with checksum.
    File,
    /// An identifier of another resource.
    Identifier,
    /// A map from string keys to values of one shape.
    Map {
        /// Shape of every map value.
        value: Box<FieldSchema>,
    },
    /// A list of values of one shape.
    List {
        /// Shape of every element.
        element: Box<FieldSchema>,
    },
    /// A named struct with a fixed set of fields.
    Struct(StructSchema),
}

impl FieldSchema {
    /// Create a map schema.
    pub fn map(value: FieldSchema) -> Self {
        Self::Map {
            value: Box::new(value),
        }
    }

    /// Create a list schema.
    pub fn list(element: FieldSchema) -> Self {
        Self::List {
            element: Box::new(element),
        }
    }

    /// A short name for the shape, used in diagnostics.
    pub fn type_name(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::File => "file",
            Self::Identifier => "identifier",
            Self::Map { .. } => "map",
            Self::List { .. } => "list",
            Self::Struct(s) => &s.name,
        }
    }

    /// Convert to the wire representation.
    pub fn to_proto(&self) -> generated::FieldSchema {
        self.into()
    }

    /// Parse from the wire representation.
    pub fn from_proto(proto: generated::FieldSchema) -> Result<Self, ProviderError> {
        proto.try_into()
    }
}

impl From<StructSchema> for FieldSchema {
    fn from(schema: StructSchema) -> Self {
        Self::Struct(schema)
    }
}

/// A named struct and its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructSchema {
    /// Type name, unique across a provider.
    pub name: String,
    /// Fields by name.
    #[serde(default)]
    pub fields: BTreeMap<String, FieldSchema>,
    /// Set on structs that form a resource's identifier.
    #[serde(default)]
    pub is_identifier: bool,
}

impl StructSchema {
    /// Create a struct with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
            is_identifier: false,
        }
    }

    /// Add a field.
    pub fn with_field(mut self, name: impl Into<String>, schema: impl Into<FieldSchema>) -> Self {
        self.fields.insert(name.into(), schema.into());
        self
    }

    /// Mark this struct as a resource identifier.
    pub fn as_identifier(mut self) -> Self {
        self.is_identifier = true;
        self
    }
}

/// Schema for one resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSchema {
    /// The resource type key, shared with identifiers and the handler registry.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Shape of the identifier value.
    pub identifier: FieldSchema,
    /// Shape of the user-supplied config.
    pub config: FieldSchema,
    /// Shape of the provider-computed attrs.
    pub attrs: FieldSchema,
}

impl ResourceSchema {
    /// Create a resource schema.
    pub fn new(
        resource_type: impl Into<String>,
        identifier: impl Into<FieldSchema>,
        config: impl Into<FieldSchema>,
        attrs: impl Into<FieldSchema>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            identifier: identifier.into(),
            config: config.into(),
            attrs: attrs.into(),
        }
    }

    /// Collect every named struct reachable from this resource.
    ///
    /// Root structs are renamed `<type>_identifier`, `<type>_config` and
    /// `<type>_attrs`. Nested structs are collected once by name; nested
    /// identifier structs are skipped since they belong to the resource
    /// they identify.
    pub fn struct_types(&self) -> Result<BTreeMap<String, StructSchema>, ProviderError> {
        let mut types = BTreeMap::new();
        self.collect_roots(&self.roots(), &mut types)?;
        Ok(types)
    }

    /// Like [`ResourceSchema::struct_types`], limited to what a consumer
    /// writes: the identifier and config trees.
    pub fn consumer_struct_types(&self) -> Result<BTreeMap<String, StructSchema>, ProviderError> {
        let mut types = BTreeMap::new();
        self.collect_roots(
            &[("identifier", &self.identifier), ("config", &self.config)],
            &mut types,
        )?;
        Ok(types)
    }

    fn roots(&self) -> [(&'static str, &FieldSchema); 3] {
        [
            ("identifier", &self.identifier),
            ("config", &self.config),
            ("attrs", &self.attrs),
        ]
    }

    fn collect_roots(
        &self,
        roots: &[(&str, &FieldSchema)],
        types: &mut BTreeMap<String, StructSchema>,
    ) -> Result<(), ProviderError> {
        for &(suffix, field) in roots {
            match field {
                FieldSchema::Struct(root) => {
                    let mut root = root.clone();
                    root.name = format!("{}_{}", self.resource_type, suffix);
                    collect_struct_types(&root, types)?;
                }
                other => collect_field(other, types)?,
            }
        }
        Ok(())
    }
}

/// Schema for a whole provider.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Provider name.
    pub name: String,
    /// Provider version.
    pub version: String,
    /// One entry per resource type.
    #[serde(default)]
    pub resources: Vec<ResourceSchema>,
}

impl Schema {
    /// Create an empty provider schema.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            resources: Vec::new(),
        }
    }

    /// Add a resource schema.
    pub fn with_resource(mut self, resource: ResourceSchema) -> Self {
        self.resources.push(resource);
        self
    }

    /// Look up the schema for a resource type.
    pub fn resource(&self, resource_type: &str) -> Option<&ResourceSchema> {
        self.resources
            .iter()
            .find(|r| r.resource_type == resource_type)
    }

    /// Collect every named struct across all resources.
    pub fn struct_types(&self) -> Result<BTreeMap<String, StructSchema>, ProviderError> {
        let mut types = BTreeMap::new();
        for resource in &self.resources {
            resource.collect_roots(&resource.roots(), &mut types)?;
        }
        Ok(types)
    }

    /// Convert to the wire representation.
    pub fn to_proto(&self) -> generated::Schema {
        self.into()
    }

    /// Parse from the wire representation.
    pub fn from_proto(proto: generated::Schema) -> Result<Self, ProviderError> {
        proto.try_into()
    }
}

/// Depth-first collection of `schema` and every struct nested below it.
///
/// A name seen twice with an identical definition is kept once; two
/// different definitions under one name are a [`ProviderError::DuplicateType`].
pub fn collect_struct_types(
    schema: &StructSchema,
    types: &mut BTreeMap<String, StructSchema>,
) -> Result<(), ProviderError> {
    match types.get(&schema.name) {
        Some(existing) if existing == schema => return Ok(()),
        Some(_) => return Err(ProviderError::DuplicateType(schema.name.clone())),
        None => {
            types.insert(schema.name.clone(), schema.clone());
        }
    }

    for field in schema.fields.values() {
        collect_field(field, types)?;
    }
    Ok(())
}

fn collect_field(
    field: &FieldSchema,
    types: &mut BTreeMap<String, StructSchema>,
) -> Result<(), ProviderError> {
    match field {
        FieldSchema::Struct(nested) if nested.is_identifier => Ok(()),
        FieldSchema::Struct(nested) => collect_struct_types(nested, types),
        FieldSchema::Map { value } => collect_field(value, types),
        FieldSchema::List { element } => collect_field(element, types),
        FieldSchema::String | FieldSchema::Bool | FieldSchema::File | FieldSchema::Identifier => {
            Ok(())
        }
    }
}

// =========================================================================
// Wire conversion
// =========================================================================

impl From<&FieldSchema> for generated::FieldSchema {
    fn from(schema: &FieldSchema) -> Self {
        let kind = match schema {
            FieldSchema::String => ProtoFieldType::StringSchema(generated::StringSchema {}),
            FieldSchema::Bool => ProtoFieldType::BoolSchema(generated::BoolSchema {}),
            FieldSchema::File => ProtoFieldType::FileSchema(generated::FileSchema {}),
            FieldSchema::Identifier => {
                ProtoFieldType::IdentifierSchema(generated::IdentifierSchema {})
            }
            FieldSchema::Map { value } => ProtoFieldType::MapSchema(generated::MapSchema {
                value: Some(Box::new(value.as_ref().into())),
            }),
            FieldSchema::List { element } => ProtoFieldType::ListSchema(generated::ListSchema {
                element: Some(Box::new(element.as_ref().into())),
            }),
            FieldSchema::Struct(s) => ProtoFieldType::StructSchema(generated::StructSchema {
                name: s.name.clone(),
                fields: s
                    .fields
                    .iter()
                    .map(|(name, field)| (name.clone(), field.into()))
                    .collect(),
                is_identifier: s.is_identifier,
            }),
        };
        Self { r#type: Some(kind) }
    }
}

impl TryFrom<generated::FieldSchema> for FieldSchema {
    type Error = ProviderError;

    fn try_from(proto: generated::FieldSchema) -> Result<Self, Self::Error> {
        let kind = proto
            .r#type
            .ok_or_else(|| ProviderError::internal("field schema has no type"))?;

        Ok(match kind {
            ProtoFieldType::StringSchema(_) => Self::String,
            ProtoFieldType::BoolSchema(_) => Self::Bool,
            ProtoFieldType::FileSchema(_) => Self::File,
            ProtoFieldType::IdentifierSchema(_) => Self::Identifier,
            ProtoFieldType::MapSchema(map) => {
                let value = map
                    .value
                    .ok_or_else(|| ProviderError::internal("map schema has no value schema"))?;
                Self::map((*value).try_into()?)
            }
            ProtoFieldType::ListSchema(list) => {
                let element = list
                    .element
                    .ok_or_else(|| ProviderError::internal("list schema has no element schema"))?;
                Self::list((*element).try_into()?)
            }
            ProtoFieldType::StructSchema(s) => Self::Struct(StructSchema {
                name: s.name,
                fields: s
                    .fields
                    .into_iter()
                    .map(|(name, field)| Ok((name, field.try_into()?)))
                    .collect::<Result<_, ProviderError>>()?,
                is_identifier: s.is_identifier,
            }),
        })
    }
}

impl From<&ResourceSchema> for generated::ResourceSchema {
    fn from(schema: &ResourceSchema) -> Self {
        Self {
            r#type: schema.resource_type.clone(),
            identifier: Some((&schema.identifier).into()),
            config: Some((&schema.config).into()),
            attrs: Some((&schema.attrs).into()),
        }
    }
}

impl TryFrom<generated::ResourceSchema> for ResourceSchema {
    type Error = ProviderError;

    fn try_from(proto: generated::ResourceSchema) -> Result<Self, Self::Error> {
        let resource_type = proto.r#type;
        let part = |field: Option<generated::FieldSchema>, name: &str| {
            field
                .ok_or_else(|| {
                    ProviderError::internal(format!(
                        "resource schema '{}' has no {} schema",
                        resource_type, name
                    ))
                })
                .and_then(FieldSchema::try_from)
        };

        let identifier = part(proto.identifier, "identifier")?;
        let config = part(proto.config, "config")?;
        let attrs = part(proto.attrs, "attrs")?;

        Ok(Self {
            resource_type,
            identifier,
            config,
            attrs,
        })
    }
}

impl From<&Schema> for generated::Schema {
    fn from(schema: &Schema) -> Self {
        Self {
            name: schema.name.clone(),
            version: schema.version.clone(),
            resources: schema.resources.iter().map(Into::into).collect(),
        }
    }
}

impl TryFrom<generated::Schema> for Schema {
    type Error = ProviderError;

    fn try_from(proto: generated::Schema) -> Result<Self, Self::Error> {
        Ok(Self {
            name: proto.name,
            version: proto.version,
            resources: proto
                .resources
                .into_iter()
                .map(ResourceSchema::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

// =========================================================================
// Diagnostics
// =========================================================================

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// An error that prevents the operation from completing.
    Error,
    /// A warning that doesn't prevent the operation but should be addressed.
    Warning,
}

/// A problem found while checking a value against its schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity of the diagnostic.
    pub severity: DiagnosticSeverity,
    /// A short summary of the issue.
    pub summary: String,
    /// A detailed description of the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Dotted path of the field where the issue occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    /// Add detail to this diagnostic.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the field path for this diagnostic.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Whether this diagnostic is an error.
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket_schema() -> ResourceSchema {
        ResourceSchema::new(
            "bucket",
            StructSchema::new("identifier")
                .with_field("name", FieldSchema::String)
                .as_identifier(),
            StructSchema::new("config")
                .with_field("expiration", FieldSchema::String)
                .with_field(
                    "rules",
                    FieldSchema::list(
                        StructSchema::new("rule")
                            .with_field("prefix", FieldSchema::String)
                            .with_field("enabled", FieldSchema::Bool)
                            .into(),
                    ),
                ),
            StructSchema::new("attrs").with_field(
                "bar",
                StructSchema::new("bar").with_field("foo", FieldSchema::String),
            ),
        )
    }

    #[test]
    fn test_field_schema_round_trip() {
        let schema = FieldSchema::Struct(
            StructSchema::new("outer")
                .with_field("file", FieldSchema::File)
                .with_field("owner", FieldSchema::Identifier)
                .with_field(
                    "tags",
                    FieldSchema::map(FieldSchema::list(
                        StructSchema::new("inner")
                            .with_field("flag", FieldSchema::Bool)
                            .as_identifier()
                            .into(),
                    )),
                ),
        );

        let back = FieldSchema::from_proto(schema.to_proto()).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn test_schema_round_trip_and_lookup() {
        let schema = Schema::new("storage", "0.1.0").with_resource(bucket_schema());

        let back = Schema::from_proto(schema.to_proto()).unwrap();
        assert_eq!(back, schema);
        assert!(back.resource("bucket").is_some());
        assert!(back.resource("queue").is_none());
    }

    #[test]
    fn test_unset_field_schema_is_rejected() {
        let proto = generated::FieldSchema { r#type: None };
        assert!(matches!(
            FieldSchema::try_from(proto),
            Err(ProviderError::Internal(_))
        ));
    }

    #[test]
    fn test_struct_types_names_roots_and_collects_nested() {
        let types = bucket_schema().struct_types().unwrap();
        let names: Vec<_> = types.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec!["bar", "bucket_attrs", "bucket_config", "bucket_identifier", "rule"]
        );
    }

    #[test]
    fn test_consumer_struct_types_leave_out_attrs() {
        let types = bucket_schema().consumer_struct_types().unwrap();
        let names: Vec<_> = types.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["bucket_config", "bucket_identifier", "rule"]);
    }

    #[test]
    fn test_struct_types_skips_nested_identifiers() {
        let schema = ResourceSchema::new(
            "object",
            StructSchema::new("identifier")
                .with_field(
                    "bucket",
                    StructSchema::new("bucket_identifier")
                        .with_field("name", FieldSchema::String)
                        .as_identifier(),
                )
                .with_field("key", FieldSchema::String)
                .as_identifier(),
            StructSchema::new("config"),
            StructSchema::new("attrs"),
        );

        let types = schema.struct_types().unwrap();
        let identifier = &types["object_identifier"];
        assert!(identifier.fields.contains_key("bucket"));
        assert!(!types.contains_key("bucket_identifier"));
    }

    #[test]
    fn test_distinct_structs_with_one_name_are_duplicates() {
        let schema = ResourceSchema::new(
            "bucket",
            FieldSchema::String,
            StructSchema::new("root")
                .with_field("a", StructSchema::new("config").with_field("x", FieldSchema::String)),
            StructSchema::new("root")
                .with_field("b", StructSchema::new("config").with_field("y", FieldSchema::Bool)),
        );

        match schema.struct_types() {
            Err(ProviderError::DuplicateType(name)) => assert_eq!(name, "config"),
            other => panic!("expected DuplicateType, got {:?}", other),
        }
    }

    #[test]
    fn test_identical_structs_are_merged() {
        let shared = StructSchema::new("tag").with_field("key", FieldSchema::String);
        let schema = ResourceSchema::new(
            "bucket",
            FieldSchema::String,
            StructSchema::new("config")
                .with_field("a", shared.clone())
                .with_field("b", FieldSchema::list(shared.into())),
            FieldSchema::map(FieldSchema::Bool),
        );

        let types = schema.struct_types().unwrap();
        assert_eq!(types.len(), 2);
        assert!(types.contains_key("tag"));
    }

    #[test]
    fn test_field_schema_json() {
        let json = serde_json::to_value(FieldSchema::map(FieldSchema::String)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "map", "value": {"type": "string"}})
        );
    }

    #[test]
    fn test_diagnostic() {
        let err = Diagnostic::error("Invalid configuration")
            .with_detail("expected string")
            .with_attribute("config.name");

        assert_eq!(err.severity, DiagnosticSeverity::Error);
        assert!(err.is_error());
        assert_eq!(err.detail, Some("expected string".to_string()));
        assert_eq!(err.attribute, Some("config.name".to_string()));
        assert!(!Diagnostic::warning("deprecated").is_error());
    }
}
