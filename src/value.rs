//! The dynamic value model.
//!
//! Providers receive and return identifiers, configuration and computed
//! attributes as [`Value`]s. A `Value` is a closed, recursive sum type that
//! maps one-to-one onto the `athanor.v1.Value` wire message, so
//! `Value::from_proto(value.to_proto())` always yields the original value.
//!
//! # Example
//!
//! ```
//! use athanor_sdk::value::{Identifier, Value};
//!
//! let id = Identifier::new("bucket", Value::map([("name", Value::from("my-bucket"))]));
//! let bytes = Value::from(id.clone()).encode_to_vec();
//! let decoded = Value::decode(&bytes).unwrap();
//!
//! assert_eq!(decoded.as_identifier().unwrap(), &id);
//! assert_eq!(decoded.as_identifier().unwrap().value.field("name").unwrap().as_str().unwrap(), "my-bucket");
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use prost::Message;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::generated;

/// The kind of a [`Value`], used in type-mismatch errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// A string.
    String,
    /// A boolean.
    Bool,
    /// A string-keyed map.
    Map,
    /// An ordered list.
    List,
    /// A file reference.
    File,
    /// A resource identifier.
    Identifier,
    /// A value that must not be updated in place.
    Immutable,
    /// The absence of a value.
    Nil,
}

impl ValueKind {
    /// The lowercase name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Map => "map",
            Self::List => "list",
            Self::File => "file",
            Self::Identifier => "identifier",
            Self::Immutable => "immutable",
            Self::Nil => "nil",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dynamically typed value carried between consumers, executors and providers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// A string.
    String(String),
    /// A boolean.
    Bool(bool),
    /// A map with unique keys. Key order carries no meaning.
    Map(BTreeMap<String, Value>),
    /// An ordered list.
    List(Vec<Value>),
    /// A file reference with its content checksum.
    File(File),
    /// A reference to another resource.
    Identifier(Identifier),
    /// Wraps a value that must never appear as an `Update` in an update mask.
    Immutable(Box<Value>),
    /// The absence of a value.
    #[default]
    Nil,
}

/// A file path together with a checksum of its contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct File {
    /// Path to the file.
    pub path: String,
    /// Checksum of the file contents.
    pub checksum: String,
}

impl File {
    /// Create a new file reference.
    pub fn new(path: impl Into<String>, checksum: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            checksum: checksum.into(),
        }
    }
}

/// The typed key naming one resource instance within a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    /// The resource type, shared with the schema and the handler registry.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// The identifying value, usually a map.
    pub value: Box<Value>,
}

impl Identifier {
    /// Create a new identifier.
    pub fn new(resource_type: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            resource_type: resource_type.into(),
            value: Box::new(value.into()),
        }
    }

    /// Convert to the wire representation.
    pub fn to_proto(&self) -> generated::Identifier {
        self.into()
    }

    /// Parse from the wire representation.
    pub fn from_proto(proto: generated::Identifier) -> Result<Self, ProviderError> {
        proto.try_into()
    }
}

impl Value {
    /// Build a map value from key/value pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a list value.
    pub fn list<V, I>(elements: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Value::List(elements.into_iter().map(Into::into).collect())
    }

    /// Mark a value as immutable.
    pub fn immutable(value: impl Into<Value>) -> Self {
        Value::Immutable(Box::new(value.into()))
    }

    /// The kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Bool(_) => ValueKind::Bool,
            Value::Map(_) => ValueKind::Map,
            Value::List(_) => ValueKind::List,
            Value::File(_) => ValueKind::File,
            Value::Identifier(_) => ValueKind::Identifier,
            Value::Immutable(_) => ValueKind::Immutable,
            Value::Nil => ValueKind::Nil,
        }
    }

    /// Whether this value is `Nil`.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Whether this value is wrapped in `Immutable`.
    pub fn is_immutable(&self) -> bool {
        matches!(self, Value::Immutable(_))
    }

    /// The value with any `Immutable` wrappers removed.
    ///
    /// All typed accessors look through `Immutable`.
    pub fn inner(&self) -> &Value {
        let mut value = self;
        while let Value::Immutable(inner) = value {
            value = inner;
        }
        value
    }

    fn wrong_kind(&self, expected: ValueKind) -> ProviderError {
        ProviderError::WrongKind {
            expected,
            actual: self.inner().kind(),
        }
    }

    /// Access the value as a string.
    pub fn as_str(&self) -> Result<&str, ProviderError> {
        match self.inner() {
            Value::String(s) => Ok(s),
            _ => Err(self.wrong_kind(ValueKind::String)),
        }
    }

    /// Access the value as a boolean.
    pub fn as_bool(&self) -> Result<bool, ProviderError> {
        match self.inner() {
            Value::Bool(b) => Ok(*b),
            _ => Err(self.wrong_kind(ValueKind::Bool)),
        }
    }

    /// Access the value as a map.
    pub fn as_map(&self) -> Result<&BTreeMap<String, Value>, ProviderError> {
        match self.inner() {
            Value::Map(m) => Ok(m),
            _ => Err(self.wrong_kind(ValueKind::Map)),
        }
    }

    /// Access the value as a list.
    pub fn as_list(&self) -> Result<&[Value], ProviderError> {
        match self.inner() {
            Value::List(l) => Ok(l),
            _ => Err(self.wrong_kind(ValueKind::List)),
        }
    }

    /// Parse the value as a list whose elements all convert to `T`.
    pub fn as_list_of<T: FromValue>(&self) -> Result<Vec<T>, ProviderError> {
        self.as_list()?.iter().map(T::from_value).collect()
    }

    /// Access the value as a resource identifier.
    pub fn as_identifier(&self) -> Result<&Identifier, ProviderError> {
        match self.inner() {
            Value::Identifier(id) => Ok(id),
            _ => Err(self.wrong_kind(ValueKind::Identifier)),
        }
    }

    /// Access the value as a file reference.
    pub fn as_file(&self) -> Result<&File, ProviderError> {
        match self.inner() {
            Value::File(f) => Ok(f),
            _ => Err(self.wrong_kind(ValueKind::File)),
        }
    }

    /// Look up a key of a map value.
    ///
    /// Fails with `WrongKind` if the value is not a map and with `Internal`
    /// if the key is missing.
    pub fn field(&self, name: &str) -> Result<&Value, ProviderError> {
        self.as_map()?
            .get(name)
            .ok_or_else(|| ProviderError::internal(format!("missing field '{}'", name)))
    }

    /// Convert to the wire representation.
    pub fn to_proto(&self) -> generated::Value {
        self.into()
    }

    /// Parse from the wire representation.
    pub fn from_proto(proto: generated::Value) -> Result<Self, ProviderError> {
        proto.try_into()
    }

    /// Serialize to protobuf bytes.
    pub fn encode_to_vec(&self) -> Vec<u8> {
        self.to_proto().encode_to_vec()
    }

    /// Parse from protobuf bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProviderError> {
        Self::from_proto(generated::Value::decode(bytes)?)
    }
}

// =========================================================================
// Wire conversion
// =========================================================================

impl From<&Value> for generated::Value {
    fn from(value: &Value) -> Self {
        use generated::value::Type;

        let ty = match value {
            Value::String(s) => Type::StringValue(s.clone()),
            Value::Bool(b) => Type::BoolValue(*b),
            Value::Map(entries) => Type::Map(generated::MapValue {
                entries: entries
                    .iter()
                    .map(|(k, v)| (k.clone(), generated::Value::from(v)))
                    .collect(),
            }),
            Value::List(elements) => Type::List(generated::ListValue {
                elements: elements.iter().map(generated::Value::from).collect(),
            }),
            Value::File(file) => Type::File(generated::File {
                path: file.path.clone(),
                checksum: file.checksum.clone(),
            }),
            Value::Identifier(id) => Type::Identifier(id.into()),
            Value::Immutable(inner) => Type::Immutable(generated::Immutable {
                value: Some(Box::new(generated::Value::from(inner.as_ref()))),
            }),
            Value::Nil => Type::Nil(generated::Nil {}),
        };

        generated::Value { r#type: Some(ty) }
    }
}

impl TryFrom<generated::Value> for Value {
    type Error = ProviderError;

    fn try_from(proto: generated::Value) -> Result<Self, Self::Error> {
        use generated::value::Type;

        match proto.r#type {
            Some(Type::StringValue(s)) => Ok(Value::String(s)),
            Some(Type::BoolValue(b)) => Ok(Value::Bool(b)),
            Some(Type::Map(map)) => map
                .entries
                .into_iter()
                .map(|(k, v)| Ok((k, Value::try_from(v)?)))
                .collect::<Result<BTreeMap<_, _>, ProviderError>>()
                .map(Value::Map),
            Some(Type::List(list)) => list
                .elements
                .into_iter()
                .map(Value::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            Some(Type::Identifier(id)) => Identifier::try_from(id).map(Value::Identifier),
            Some(Type::File(file)) => Ok(Value::File(File {
                path: file.path,
                checksum: file.checksum,
            })),
            Some(Type::Immutable(immutable)) => {
                let inner = immutable
                    .value
                    .ok_or_else(|| ProviderError::internal("immutable value has no inner value"))?;
                Ok(Value::Immutable(Box::new(Value::try_from(*inner)?)))
            }
            Some(Type::Nil(_)) => Ok(Value::Nil),
            None => Err(ProviderError::internal("value has no type set")),
        }
    }
}

impl From<&Identifier> for generated::Identifier {
    fn from(id: &Identifier) -> Self {
        generated::Identifier {
            r#type: id.resource_type.clone(),
            value: Some(Box::new(generated::Value::from(id.value.as_ref()))),
        }
    }
}

impl TryFrom<generated::Identifier> for Identifier {
    type Error = ProviderError;

    fn try_from(proto: generated::Identifier) -> Result<Self, Self::Error> {
        let value = proto.value.ok_or_else(|| {
            ProviderError::internal(format!("identifier of type '{}' has no value", proto.r#type))
        })?;
        Ok(Identifier {
            resource_type: proto.r#type,
            value: Box::new(Value::try_from(*value)?),
        })
    }
}

// =========================================================================
// Native conversions
// =========================================================================

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<File> for Value {
    fn from(f: File) -> Self {
        Value::File(f)
    }
}

impl From<Identifier> for Value {
    fn from(id: Identifier) -> Self {
        Value::Identifier(id)
    }
}

impl From<Vec<Value>> for Value {
    fn from(elements: Vec<Value>) -> Self {
        Value::List(elements)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Value::Map(entries)
    }
}

/// Conversion from a native type into a [`Value`].
pub trait ToValue {
    /// Produce the value representation of `self`.
    fn to_value(&self) -> Value;
}

/// Convert any [`ToValue`] type into a [`Value`].
pub fn to_value<T: ToValue + ?Sized>(value: &T) -> Value {
    value.to_value()
}

/// A type that names a resource instance.
///
/// Implementors produce their value through [`ToValue`], normally a
/// [`Value::Identifier`] carrying [`ResourceIdentifier::resource_type`].
pub trait ResourceIdentifier: ToValue {
    /// The resource type this identifier belongs to.
    fn resource_type(&self) -> &str;

    /// The identifier form of this value.
    fn to_identifier(&self) -> Identifier {
        match self.to_value() {
            Value::Identifier(id) if id.resource_type == self.resource_type() => id,
            other => Identifier::new(self.resource_type(), other),
        }
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ToValue for File {
    fn to_value(&self) -> Value {
        Value::File(self.clone())
    }
}

impl ToValue for Identifier {
    fn to_value(&self) -> Value {
        Value::Identifier(self.clone())
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Nil,
        }
    }
}

impl<T: ToValue> ToValue for BTreeMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect(),
        )
    }
}

impl<T: ToValue> ToValue for HashMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_value()))
                .collect(),
        )
    }
}

/// Conversion from a [`Value`] into a native type.
pub trait FromValue: Sized {
    /// Parse `value` into `Self`, failing with `WrongKind` on a mismatch.
    fn from_value(value: &Value) -> Result<Self, ProviderError>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, ProviderError> {
        Ok(value.clone())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ProviderError> {
        value.as_str().map(str::to_owned)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, ProviderError> {
        value.as_bool()
    }
}

impl FromValue for File {
    fn from_value(value: &Value) -> Result<Self, ProviderError> {
        value.as_file().cloned()
    }
}

impl FromValue for Identifier {
    fn from_value(value: &Value) -> Result<Self, ProviderError> {
        value.as_identifier().cloned()
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self, ProviderError> {
        value.as_list_of()
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: &Value) -> Result<Self, ProviderError> {
        value
            .as_map()?
            .iter()
            .map(|(k, v)| Ok((k.clone(), T::from_value(v)?)))
            .collect()
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, ProviderError> {
        if value.inner().is_nil() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BucketIdentifier {
        account: String,
        name: String,
    }

    impl ToValue for BucketIdentifier {
        fn to_value(&self) -> Value {
            Value::Identifier(Identifier::new(
                self.resource_type(),
                Value::map([
                    ("account", self.account.to_value()),
                    ("name", self.name.to_value()),
                ]),
            ))
        }
    }

    impl ResourceIdentifier for BucketIdentifier {
        fn resource_type(&self) -> &str {
            "bucket"
        }
    }

    fn sample() -> Value {
        Value::map([
            ("name", Value::from("my-bucket")),
            ("versioned", Value::from(true)),
            ("tags", Value::list(["a", "b"])),
            ("policy", Value::File(File::new("policy.json", "abc123"))),
            (
                "parent",
                Value::Identifier(Identifier::new(
                    "project",
                    Value::map([("id", Value::from("p-1"))]),
                )),
            ),
            ("region", Value::immutable("us-east-1")),
            ("lifecycle", Value::Nil),
            ("empty", Value::Map(BTreeMap::new())),
        ])
    }

    #[test]
    fn test_round_trip_through_wire() {
        let value = sample();
        let decoded = Value::decode(&value.encode_to_vec()).unwrap();
        assert_eq!(decoded, value);

        for value in [
            Value::Nil,
            Value::from(""),
            Value::from(false),
            Value::List(vec![]),
            Value::immutable(Value::immutable(Value::list([Value::Nil]))),
        ] {
            assert_eq!(Value::from_proto(value.to_proto()).unwrap(), value);
        }
    }

    #[test]
    fn test_parse_rejects_unset_type() {
        let err = Value::from_proto(generated::Value { r#type: None }).unwrap_err();
        assert!(matches!(err, ProviderError::Internal(_)));

        let proto = generated::Identifier {
            r#type: "bucket".to_string(),
            value: None,
        };
        let err = Identifier::from_proto(proto).unwrap_err();
        assert!(err.to_string().contains("bucket"));
    }

    #[test]
    fn test_accessors_report_expected_and_actual() {
        let value = Value::from("x");
        assert_eq!(value.as_str().unwrap(), "x");

        match value.as_map().unwrap_err() {
            ProviderError::WrongKind { expected, actual } => {
                assert_eq!(expected, ValueKind::Map);
                assert_eq!(actual, ValueKind::String);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(matches!(
            Value::Nil.as_bool(),
            Err(ProviderError::WrongKind {
                expected: ValueKind::Bool,
                actual: ValueKind::Nil
            })
        ));
        assert!(matches!(
            Value::from(true).as_identifier(),
            Err(ProviderError::WrongKind {
                expected: ValueKind::Identifier,
                ..
            })
        ));
        assert!(matches!(
            Value::from(true).as_file(),
            Err(ProviderError::WrongKind {
                expected: ValueKind::File,
                ..
            })
        ));
    }

    #[test]
    fn test_accessors_see_through_immutable() {
        let value = Value::immutable("us-east-1");
        assert!(value.is_immutable());
        assert_eq!(value.as_str().unwrap(), "us-east-1");
        assert_eq!(value.inner(), &Value::from("us-east-1"));
    }

    #[test]
    fn test_list_of() {
        let value = Value::list(["a", "b"]);
        let strings: Vec<String> = value.as_list_of().unwrap();
        assert_eq!(strings, vec!["a".to_string(), "b".to_string()]);

        let mixed = Value::list([Value::from("a"), Value::from(true)]);
        let err = mixed.as_list_of::<String>().unwrap_err();
        assert!(matches!(
            err,
            ProviderError::WrongKind {
                expected: ValueKind::String,
                actual: ValueKind::Bool
            }
        ));
    }

    #[test]
    fn test_field_lookup() {
        let value = sample();
        assert_eq!(value.field("name").unwrap().as_str().unwrap(), "my-bucket");
        assert!(matches!(
            value.field("missing"),
            Err(ProviderError::Internal(_))
        ));
        assert!(matches!(
            Value::from("x").field("name"),
            Err(ProviderError::WrongKind { .. })
        ));
    }

    #[test]
    fn test_to_value_from_native_types() {
        let mut labels = HashMap::new();
        labels.insert("env".to_string(), "prod".to_string());

        assert_eq!(to_value("x"), Value::from("x"));
        assert_eq!(to_value(&true), Value::Bool(true));
        assert_eq!(to_value(&None::<String>), Value::Nil);
        assert_eq!(
            to_value(&vec!["a".to_string()]),
            Value::List(vec![Value::from("a")])
        );
        assert_eq!(labels.to_value(), Value::map([("env", "prod")]));
    }

    #[test]
    fn test_resource_identifier_delegates() {
        let id = BucketIdentifier {
            account: "12345".to_string(),
            name: "my-bucket".to_string(),
        };

        let as_dyn: &dyn ResourceIdentifier = &id;
        let value = to_value(as_dyn);
        let identifier = value.as_identifier().unwrap();
        assert_eq!(identifier.resource_type, "bucket");
        assert_eq!(
            identifier.value.field("account").unwrap().as_str().unwrap(),
            "12345"
        );
        assert_eq!(&id.to_identifier(), identifier);
    }

    #[test]
    fn test_from_value() {
        let value = sample();
        let name = String::from_value(value.field("name").unwrap()).unwrap();
        assert_eq!(name, "my-bucket");

        let lifecycle = Option::<String>::from_value(value.field("lifecycle").unwrap()).unwrap();
        assert!(lifecycle.is_none());

        let tags = Vec::<String>::from_value(value.field("tags").unwrap()).unwrap();
        assert_eq!(tags.len(), 2);

        let labels =
            BTreeMap::<String, String>::from_value(&Value::map([("env", "prod")])).unwrap();
        assert_eq!(labels["env"], "prod");
    }

    #[test]
    fn test_json_representation() {
        let value = Value::map([("name", "x")]);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "map", "value": {"name": {"kind": "string", "value": "x"}}})
        );
        let back: Value = serde_json::from_value(json).unwrap();
        assert_eq!(back, value);
    }
}
