//! The expression algebra used by consumer programs.
//!
//! An [`Expr`] describes a value without evaluating it. Literals, maps and
//! lists describe data; [`ResourceIdentifierExpr`], [`ResourceExpr`] and
//! [`ProviderExpr`] declare resources and providers; `Get`, `IoGet` and
//! `GetResource` are references that an executor resolves later.
//!
//! `Get` and `IoGet` share a payload but not a meaning. A `Get` projects a
//! field that is known when the blueprint is built. An `IoGet` projects a
//! field that only exists once the referenced resource has been realised,
//! so executors must order evaluation around it. The two are never
//! interchangeable.
//!
//! # Example
//!
//! ```
//! use athanor_sdk::expr::{Expr, ResourceIdentifierExpr};
//!
//! let bucket = ResourceIdentifierExpr::new("my-bucket", "bucket", Expr::map([("name", "x")]));
//!
//! // The `foo` attribute of the bucket, known only after it exists.
//! let foo = Expr::get_resource("my-bucket").io_get("attrs").io_get("foo");
//!
//! let decoded = Expr::from_proto(foo.to_proto()).unwrap();
//! assert_eq!(decoded, foo);
//! assert_eq!(bucket.get_resource(), Expr::get_resource("my-bucket"));
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::generated;
use crate::generated::expr::Type as ProtoExpr;

/// An unevaluated expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Expr {
    /// A string literal.
    StringLiteral(String),
    /// A boolean literal.
    BoolLiteral(bool),
    /// The absent value.
    Nil,
    /// A map of expressions.
    Map(BTreeMap<String, Expr>),
    /// A list of expressions.
    List(Vec<Expr>),
    /// A local file.
    File(FileExpr),
    /// Declares the identifier of a resource under an alias.
    ResourceIdentifier(ResourceIdentifierExpr),
    /// Declares a resource.
    Resource(ResourceExpr),
    /// Declares a provider.
    Provider(ProviderExpr),
    /// Projects a field known at build time.
    Get(GetExpr),
    /// Projects a field known only once the referenced resource is realised.
    IoGet(GetExpr),
    /// Refers to a resource declared elsewhere in the blueprint.
    GetResource(GetResourceExpr),
    /// Placeholder for configuration supplied by the executor at run time.
    GetRuntimeConfig,
}

/// A local file path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileExpr {
    /// Path relative to the consumer program.
    pub path: String,
}

/// A resource identifier bound to a blueprint-local alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIdentifierExpr {
    /// Blueprint-local name of the resource.
    pub alias: String,
    /// The provider's resource type.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// The identifier value.
    pub value: Box<Expr>,
}

/// A resource declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceExpr {
    /// The provider that manages the resource.
    pub provider: Box<Expr>,
    /// The resource identifier, normally a [`ResourceIdentifierExpr`].
    pub identifier: Box<Expr>,
    /// Desired configuration.
    pub config: Box<Expr>,
    /// Whether the resource should exist; `false` asks for its removal.
    pub exists: Box<Expr>,
}

/// A provider declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderExpr {
    /// Blueprint-local name of the provider.
    pub alias: String,
    /// Provider name.
    pub name: String,
    /// Provider version.
    pub version: String,
}

/// A field projection, shared by `Get` and `IoGet`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetExpr {
    /// Field to project.
    pub name: String,
    /// Expression the field is read from.
    pub object: Box<Expr>,
}

/// A late-bound reference to a declared resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetResourceExpr {
    /// Alias of the referenced resource.
    pub alias: String,
}

impl Expr {
    /// Build a map expression.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: ToExpr,
        I: IntoIterator<Item = (K, V)>,
    {
        Expr::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.to_expr()))
                .collect(),
        )
    }

    /// Build a list expression.
    pub fn list<V, I>(elements: I) -> Self
    where
        V: ToExpr,
        I: IntoIterator<Item = V>,
    {
        Expr::List(elements.into_iter().map(|e| e.to_expr()).collect())
    }

    /// A file expression.
    pub fn file(path: impl Into<String>) -> Self {
        Expr::File(FileExpr { path: path.into() })
    }

    /// A reference to the resource declared under `alias`.
    ///
    /// Nothing is resolved here; the alias is looked up by the executor.
    pub fn get_resource(alias: impl Into<String>) -> Self {
        Expr::GetResource(GetResourceExpr {
            alias: alias.into(),
        })
    }

    /// The runtime configuration placeholder.
    pub fn runtime_config() -> Self {
        Expr::GetRuntimeConfig
    }

    /// Project `name` out of this expression at build time.
    pub fn get(self, name: impl Into<String>) -> Self {
        Expr::Get(GetExpr {
            name: name.into(),
            object: Box::new(self),
        })
    }

    /// Project `name` out of this expression once it has been realised.
    pub fn io_get(self, name: impl Into<String>) -> Self {
        Expr::IoGet(GetExpr {
            name: name.into(),
            object: Box::new(self),
        })
    }

    /// Visit this expression and every expression below it, parents first.
    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a Expr)) {
        f(self);
        match self {
            Expr::Map(entries) => {
                for entry in entries.values() {
                    entry.visit(f);
                }
            }
            Expr::List(elements) => {
                for element in elements {
                    element.visit(f);
                }
            }
            Expr::ResourceIdentifier(id) => id.value.visit(f),
            Expr::Resource(resource) => {
                resource.provider.visit(f);
                resource.identifier.visit(f);
                resource.config.visit(f);
                resource.exists.visit(f);
            }
            Expr::Get(get) | Expr::IoGet(get) => get.object.visit(f),
            Expr::StringLiteral(_)
            | Expr::BoolLiteral(_)
            | Expr::Nil
            | Expr::File(_)
            | Expr::Provider(_)
            | Expr::GetResource(_)
            | Expr::GetRuntimeConfig => {}
        }
    }

    /// Convert to the wire representation.
    pub fn to_proto(&self) -> generated::Expr {
        self.into()
    }

    /// Parse from the wire representation.
    pub fn from_proto(proto: generated::Expr) -> Result<Self, ProviderError> {
        proto.try_into()
    }
}

impl ResourceIdentifierExpr {
    /// Declare an identifier under `alias`.
    pub fn new(
        alias: impl Into<String>,
        resource_type: impl Into<String>,
        value: impl ToExpr,
    ) -> Self {
        Self {
            alias: alias.into(),
            resource_type: resource_type.into(),
            value: Box::new(value.to_expr()),
        }
    }

    /// A late-bound reference to this resource.
    pub fn get_resource(&self) -> Expr {
        Expr::get_resource(self.alias.clone())
    }
}

impl ResourceExpr {
    /// Declare a resource.
    pub fn new(
        provider: impl ToExpr,
        identifier: impl ToExpr,
        config: impl ToExpr,
        exists: impl ToExpr,
    ) -> Self {
        Self {
            provider: Box::new(provider.to_expr()),
            identifier: Box::new(identifier.to_expr()),
            config: Box::new(config.to_expr()),
            exists: Box::new(exists.to_expr()),
        }
    }
}

impl ProviderExpr {
    /// Declare a provider, aliased by its name.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            alias: name.clone(),
            name,
            version: version.into(),
        }
    }

    /// Use a different alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }
}

// =========================================================================
// ToExpr
// =========================================================================

/// Conversion of native and generated types into expressions.
///
/// Generated consumer bindings implement this for their config and
/// identifier structs.
pub trait ToExpr {
    /// Produce the expression for `self`.
    fn to_expr(&self) -> Expr;
}

impl ToExpr for Expr {
    fn to_expr(&self) -> Expr {
        self.clone()
    }
}

impl ToExpr for str {
    fn to_expr(&self) -> Expr {
        Expr::StringLiteral(self.to_string())
    }
}

impl ToExpr for String {
    fn to_expr(&self) -> Expr {
        Expr::StringLiteral(self.clone())
    }
}

impl ToExpr for bool {
    fn to_expr(&self) -> Expr {
        Expr::BoolLiteral(*self)
    }
}

impl ToExpr for () {
    fn to_expr(&self) -> Expr {
        Expr::Nil
    }
}

impl<T: ToExpr + ?Sized> ToExpr for &T {
    fn to_expr(&self) -> Expr {
        (**self).to_expr()
    }
}

impl<T: ToExpr> ToExpr for Option<T> {
    fn to_expr(&self) -> Expr {
        match self {
            Some(inner) => inner.to_expr(),
            None => Expr::Nil,
        }
    }
}

impl<T: ToExpr> ToExpr for [T] {
    fn to_expr(&self) -> Expr {
        Expr::List(self.iter().map(ToExpr::to_expr).collect())
    }
}

impl<T: ToExpr> ToExpr for Vec<T> {
    fn to_expr(&self) -> Expr {
        self.as_slice().to_expr()
    }
}

impl<T: ToExpr> ToExpr for BTreeMap<String, T> {
    fn to_expr(&self) -> Expr {
        Expr::Map(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_expr()))
                .collect(),
        )
    }
}

impl<T: ToExpr> ToExpr for HashMap<String, T> {
    fn to_expr(&self) -> Expr {
        Expr::Map(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_expr()))
                .collect(),
        )
    }
}

impl ToExpr for FileExpr {
    fn to_expr(&self) -> Expr {
        Expr::File(self.clone())
    }
}

impl ToExpr for ResourceIdentifierExpr {
    fn to_expr(&self) -> Expr {
        Expr::ResourceIdentifier(self.clone())
    }
}

impl ToExpr for ResourceExpr {
    fn to_expr(&self) -> Expr {
        Expr::Resource(self.clone())
    }
}

impl ToExpr for ProviderExpr {
    fn to_expr(&self) -> Expr {
        Expr::Provider(self.clone())
    }
}

impl ToExpr for GetResourceExpr {
    fn to_expr(&self) -> Expr {
        Expr::GetResource(self.clone())
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::StringLiteral(value.to_string())
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Expr::StringLiteral(value)
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Expr::BoolLiteral(value)
    }
}

// =========================================================================
// Wire conversion
// =========================================================================

fn boxed(expr: &Expr) -> Option<Box<generated::Expr>> {
    Some(Box::new(expr.into()))
}

fn unboxed(
    proto: Option<Box<generated::Expr>>,
    what: &str,
) -> Result<Box<Expr>, ProviderError> {
    let proto = proto.ok_or_else(|| ProviderError::internal(format!("{} is missing", what)))?;
    Ok(Box::new(Expr::try_from(*proto)?))
}

impl From<&GetExpr> for generated::GetExpr {
    fn from(get: &GetExpr) -> Self {
        Self {
            name: get.name.clone(),
            object: boxed(&get.object),
        }
    }
}

impl TryFrom<generated::GetExpr> for GetExpr {
    type Error = ProviderError;

    fn try_from(proto: generated::GetExpr) -> Result<Self, Self::Error> {
        let what = format!("object of get '{}'", proto.name);
        Ok(Self {
            object: unboxed(proto.object, &what)?,
            name: proto.name,
        })
    }
}

impl From<&Expr> for generated::Expr {
    fn from(expr: &Expr) -> Self {
        let kind = match expr {
            Expr::StringLiteral(s) => ProtoExpr::StringLiteral(s.clone()),
            Expr::BoolLiteral(b) => ProtoExpr::BoolLiteral(*b),
            Expr::Nil => ProtoExpr::Nil(generated::Nil {}),
            Expr::Map(entries) => ProtoExpr::Map(generated::MapExpr {
                entries: entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.into()))
                    .collect(),
            }),
            Expr::List(elements) => ProtoExpr::List(generated::ListExpr {
                elements: elements.iter().map(Into::into).collect(),
            }),
            Expr::File(file) => ProtoExpr::File(generated::FileExpr {
                path: file.path.clone(),
            }),
            Expr::ResourceIdentifier(id) => {
                ProtoExpr::ResourceIdentifier(generated::ResourceIdentifierExpr {
                    alias: id.alias.clone(),
                    r#type: id.resource_type.clone(),
                    value: boxed(&id.value),
                })
            }
            Expr::Resource(resource) => ProtoExpr::Resource(generated::ResourceExpr {
                provider: boxed(&resource.provider),
                identifier: boxed(&resource.identifier),
                config: boxed(&resource.config),
                exists: boxed(&resource.exists),
            }),
            Expr::Provider(provider) => ProtoExpr::Provider(generated::ProviderExpr {
                alias: provider.alias.clone(),
                name: provider.name.clone(),
                version: provider.version.clone(),
            }),
            Expr::Get(get) => ProtoExpr::Get(get.into()),
            Expr::IoGet(get) => ProtoExpr::IoGet(get.into()),
            Expr::GetResource(get) => ProtoExpr::GetResource(generated::GetResourceExpr {
                alias: get.alias.clone(),
            }),
            Expr::GetRuntimeConfig => {
                ProtoExpr::GetRuntimeConfig(generated::GetRuntimeConfigExpr {})
            }
        };
        Self { r#type: Some(kind) }
    }
}

impl TryFrom<generated::Expr> for Expr {
    type Error = ProviderError;

    fn try_from(proto: generated::Expr) -> Result<Self, Self::Error> {
        let kind = proto
            .r#type
            .ok_or_else(|| ProviderError::internal("expression has no type set"))?;

        Ok(match kind {
            ProtoExpr::StringLiteral(s) => Expr::StringLiteral(s),
            ProtoExpr::BoolLiteral(b) => Expr::BoolLiteral(b),
            ProtoExpr::Nil(_) => Expr::Nil,
            ProtoExpr::Map(map) => Expr::Map(
                map.entries
                    .into_iter()
                    .map(|(k, v)| Ok((k, Expr::try_from(v)?)))
                    .collect::<Result<_, ProviderError>>()?,
            ),
            ProtoExpr::List(list) => Expr::List(
                list.elements
                    .into_iter()
                    .map(Expr::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            ProtoExpr::File(file) => Expr::File(FileExpr { path: file.path }),
            ProtoExpr::ResourceIdentifier(id) => {
                let what = format!("value of resource identifier '{}'", id.alias);
                Expr::ResourceIdentifier(ResourceIdentifierExpr {
                    value: unboxed(id.value, &what)?,
                    alias: id.alias,
                    resource_type: id.r#type,
                })
            }
            ProtoExpr::Resource(resource) => Expr::Resource(ResourceExpr {
                provider: unboxed(resource.provider, "resource provider")?,
                identifier: unboxed(resource.identifier, "resource identifier")?,
                config: unboxed(resource.config, "resource config")?,
                exists: unboxed(resource.exists, "resource exists flag")?,
            }),
            ProtoExpr::Provider(provider) => Expr::Provider(ProviderExpr {
                alias: provider.alias,
                name: provider.name,
                version: provider.version,
            }),
            ProtoExpr::Get(get) => Expr::Get(get.try_into()?),
            ProtoExpr::IoGet(get) => Expr::IoGet(get.try_into()?),
            ProtoExpr::GetResource(get) => Expr::GetResource(GetResourceExpr { alias: get.alias }),
            ProtoExpr::GetRuntimeConfig(_) => Expr::GetRuntimeConfig,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BucketConfig {
        expiration: String,
        versioned: Option<bool>,
    }

    impl ToExpr for BucketConfig {
        fn to_expr(&self) -> Expr {
            Expr::map([
                ("expiration", self.expiration.to_expr()),
                ("versioned", self.versioned.to_expr()),
            ])
        }
    }

    fn round_trip(expr: &Expr) -> Expr {
        Expr::from_proto(expr.to_proto()).unwrap()
    }

    #[test]
    fn test_every_node_round_trips() {
        let provider = ProviderExpr::new("gcp", "v0.0.1");
        let id = ResourceIdentifierExpr::new(
            "my-bucket",
            "bucket",
            Expr::map([("name", "x"), ("region", "us-east-1")]),
        );

        let exprs = vec![
            Expr::from("literal"),
            Expr::from(true),
            Expr::Nil,
            Expr::list([Expr::file("main.zip"), Expr::runtime_config()]),
            id.to_expr(),
            provider.to_expr(),
            ResourceExpr::new(&provider, &id, Expr::map([("expiration", "12h")]), true).to_expr(),
            Expr::map([("a", "b")]).get("a"),
            id.get_resource().io_get("attrs").io_get("bar").io_get("foo"),
        ];

        for expr in &exprs {
            assert_eq!(&round_trip(expr), expr);
        }
    }

    #[test]
    fn test_get_and_io_get_stay_distinct() {
        let get = Expr::get_resource("b").get("attrs");
        let io_get = Expr::get_resource("b").io_get("attrs");
        assert_ne!(get, io_get);

        assert!(matches!(round_trip(&get), Expr::Get(_)));
        assert!(matches!(round_trip(&io_get), Expr::IoGet(_)));
    }

    #[test]
    fn test_to_expr_for_native_types() {
        assert_eq!(None::<String>.to_expr(), Expr::Nil);
        assert_eq!(().to_expr(), Expr::Nil);
        assert_eq!(
            vec!["a", "b"].to_expr(),
            Expr::List(vec![Expr::from("a"), Expr::from("b")])
        );

        let mut tags = HashMap::new();
        tags.insert("team".to_string(), "infra".to_string());
        assert_eq!(tags.to_expr(), Expr::map([("team", "infra")]));
    }

    #[test]
    fn test_to_expr_for_user_types() {
        let config = BucketConfig {
            expiration: "12h".to_string(),
            versioned: None,
        };
        assert_eq!(
            config.to_expr(),
            Expr::map([("expiration", Expr::from("12h")), ("versioned", Expr::Nil)])
        );
    }

    #[test]
    fn test_provider_alias_defaults_to_name() {
        let provider = ProviderExpr::new("gcp", "v0.0.1");
        assert_eq!(provider.alias, "gcp");
        assert_eq!(provider.with_alias("gcp-eu").alias, "gcp-eu");
    }

    #[test]
    fn test_visit_reaches_nested_declarations() {
        let expr = ResourceExpr::new(
            ProviderExpr::new("gcp", "v1"),
            ResourceIdentifierExpr::new("obj", "object", Expr::map([(
                "bucket",
                ResourceIdentifierExpr::new("bkt", "bucket", "x").to_expr(),
            )])),
            Expr::Nil,
            true,
        )
        .to_expr();

        let mut aliases = Vec::new();
        expr.visit(&mut |e| match e {
            Expr::ResourceIdentifier(id) => aliases.push(id.alias.as_str()),
            Expr::Provider(p) => aliases.push(p.alias.as_str()),
            _ => {}
        });
        assert_eq!(aliases, vec!["gcp", "obj", "bkt"]);
    }

    #[test]
    fn test_unset_expression_is_rejected() {
        let err = Expr::try_from(generated::Expr { r#type: None }).unwrap_err();
        assert!(matches!(err, ProviderError::Internal(_)));

        let get = generated::Expr {
            r#type: Some(ProtoExpr::Get(generated::GetExpr {
                name: "attrs".to_string(),
                object: None,
            })),
        };
        assert!(Expr::try_from(get).is_err());
    }

    #[test]
    fn test_json_representation() {
        let json = serde_json::to_value(Expr::from("x")).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "string_literal", "value": "x"}));

        let parsed: Vec<Expr> =
            serde_json::from_str(r#"[{"kind": "bool_literal", "value": true}, {"kind": "nil"}]"#)
                .unwrap();
        assert_eq!(parsed, vec![Expr::BoolLiteral(true), Expr::Nil]);
    }
}
