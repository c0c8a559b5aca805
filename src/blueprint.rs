//! The blueprint builder.
//!
//! A [`Blueprint`] is the ordered list of statements a consumer program
//! produces: resource declarations and build declarations. Statement order
//! is declaration order and is preserved exactly through serialization.
//!
//! Aliases share one namespace per blueprint. Every occurrence of an alias
//! must carry the same definition, and no two resource statements may
//! declare the same alias. [`Blueprint::validate`] enforces both rules and
//! runs before every conversion to or from the wire format.
//!
//! # Example
//!
//! ```
//! use athanor_sdk::blueprint::Blueprint;
//! use athanor_sdk::expr::{Expr, ProviderExpr, ResourceExpr, ResourceIdentifierExpr};
//!
//! let gcp = ProviderExpr::new("gcp", "v0.0.1");
//! let bucket = ResourceIdentifierExpr::new("bucket", "bucket", Expr::map([("name", "x")]));
//!
//! let blueprint = Blueprint::new()
//!     .with_resource(ResourceExpr::new(&gcp, &bucket, Expr::map([("expiration", "12h")]), true));
//!
//! let bytes = blueprint.encode_to_vec().unwrap();
//! let decoded = Blueprint::decode(&bytes).unwrap();
//! assert_eq!(decoded, blueprint);
//! assert_eq!(decoded.resolve_alias("bucket"), Some(&bucket));
//! ```

use std::collections::{HashMap, HashSet};

use prost::Message;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::expr::{Expr, ProviderExpr, ResourceIdentifierExpr, ToExpr};
use crate::generated;

/// Where a build's program or a translator is fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Source {
    /// A path on the local filesystem.
    FilePath {
        /// Filesystem path.
        path: String,
    },
    /// An asset attached to a GitHub release.
    GitHubRelease {
        /// Owner of the repository.
        repo_owner: String,
        /// Repository name.
        repo_name: String,
        /// Asset name within the release.
        name: String,
    },
}

impl Source {
    /// A local path source.
    pub fn file_path(path: impl Into<String>) -> Self {
        Self::FilePath { path: path.into() }
    }

    /// A GitHub release asset source.
    pub fn github_release(
        repo_owner: impl Into<String>,
        repo_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::GitHubRelease {
            repo_owner: repo_owner.into(),
            repo_name: repo_name.into(),
            name: name.into(),
        }
    }
}

/// The translator that runs a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatorRef {
    /// Where the translator is fetched from.
    pub source: Source,
    /// Translator name.
    pub name: String,
}

impl TranslatorRef {
    /// Create a translator reference.
    pub fn new(source: Source, name: impl Into<String>) -> Self {
        Self {
            source,
            name: name.into(),
        }
    }
}

/// A resource declaration statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStmt {
    /// The declared resource, normally an [`Expr::Resource`].
    pub expr: Expr,
}

impl ResourceStmt {
    /// The identifier this statement declares, if its expression is a
    /// resource with a literal identifier.
    pub fn declared_identifier(&self) -> Option<&ResourceIdentifierExpr> {
        match &self.expr {
            Expr::Resource(resource) => match resource.identifier.as_ref() {
                Expr::ResourceIdentifier(id) => Some(id),
                _ => None,
            },
            _ => None,
        }
    }
}

/// A nested blueprint build: another program, run by a translator, whose
/// blueprint is included under `alias`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStmt {
    /// Alias the nested blueprint is known by.
    pub alias: String,
    /// Where the nested program is fetched from.
    pub source: Source,
    /// The translator that runs the nested program.
    pub translator: TranslatorRef,
    /// Positional config handed to the nested program.
    #[serde(default)]
    pub config: Vec<Expr>,
    /// Configuration resolved by the executor at run time.
    pub runtime_config: Expr,
}

impl BuildStmt {
    /// Create a build with no config.
    pub fn new(alias: impl Into<String>, source: Source, translator: TranslatorRef) -> Self {
        Self {
            alias: alias.into(),
            source,
            translator,
            config: Vec::new(),
            runtime_config: Expr::Nil,
        }
    }

    /// Append a positional config expression.
    pub fn with_config(mut self, config: impl ToExpr) -> Self {
        self.config.push(config.to_expr());
        self
    }

    /// Set the runtime config expression.
    pub fn with_runtime_config(mut self, runtime_config: impl ToExpr) -> Self {
        self.runtime_config = runtime_config.to_expr();
        self
    }
}

/// One blueprint statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum Stmt {
    /// Declares a resource.
    Resource(ResourceStmt),
    /// Includes a nested blueprint.
    Build(BuildStmt),
}

/// An ordered list of statements.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Blueprint {
    stmts: Vec<Stmt>,
}

#[derive(Debug, PartialEq)]
enum AliasDefinition<'a> {
    Identifier(&'a ResourceIdentifierExpr),
    Provider(&'a ProviderExpr),
    Build(&'a BuildStmt),
}

impl Blueprint {
    /// Create an empty blueprint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resource statement.
    pub fn with_resource(mut self, resource: impl ToExpr) -> Self {
        self.stmts.push(Stmt::Resource(ResourceStmt {
            expr: resource.to_expr(),
        }));
        self
    }

    /// Append a build statement.
    pub fn with_build(mut self, build: BuildStmt) -> Self {
        self.stmts.push(Stmt::Build(build));
        self
    }

    /// Statements in declaration order.
    pub fn stmts(&self) -> &[Stmt] {
        &self.stmts
    }

    /// Number of statements.
    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    /// Whether the blueprint has no statements.
    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }

    /// Check the alias rules.
    pub fn validate(&self) -> Result<(), ProviderError> {
        let mut definitions: HashMap<&str, AliasDefinition<'_>> = HashMap::new();
        let mut declared: HashSet<&str> = HashSet::new();

        for stmt in &self.stmts {
            let mut found = Vec::new();
            match stmt {
                Stmt::Resource(resource) => {
                    if let Some(id) = resource.declared_identifier() {
                        if !declared.insert(id.alias.as_str()) {
                            return Err(ProviderError::DuplicateAlias(id.alias.clone()));
                        }
                    }
                    collect_definitions(&resource.expr, &mut found);
                }
                Stmt::Build(build) => {
                    for config in &build.config {
                        collect_definitions(config, &mut found);
                    }
                    collect_definitions(&build.runtime_config, &mut found);
                    found.push((build.alias.as_str(), AliasDefinition::Build(build)));
                }
            }

            for (alias, definition) in found {
                if alias.is_empty() {
                    continue;
                }
                match definitions.get(alias) {
                    Some(existing) if *existing == definition => {}
                    Some(_) => return Err(ProviderError::DuplicateAlias(alias.to_string())),
                    None => {
                        definitions.insert(alias, definition);
                    }
                }
            }
        }

        Ok(())
    }

    /// Find the identifier declared under `alias` by a resource statement.
    ///
    /// This is the lookup an executor performs for `GetResource`.
    pub fn resolve_alias(&self, alias: &str) -> Option<&ResourceIdentifierExpr> {
        self.stmts.iter().find_map(|stmt| match stmt {
            Stmt::Resource(resource) => resource
                .declared_identifier()
                .filter(|id| id.alias == alias),
            Stmt::Build(_) => None,
        })
    }

    /// Validate and convert to the wire representation.
    pub fn to_proto(&self) -> Result<generated::Blueprint, ProviderError> {
        self.validate()?;
        Ok(generated::Blueprint {
            stmts: self.stmts.iter().map(Into::into).collect(),
        })
    }

    /// Parse and validate a wire blueprint.
    pub fn from_proto(proto: generated::Blueprint) -> Result<Self, ProviderError> {
        let blueprint = Self {
            stmts: proto
                .stmts
                .into_iter()
                .map(Stmt::try_from)
                .collect::<Result<_, _>>()?,
        };
        blueprint.validate()?;
        Ok(blueprint)
    }

    /// Validate and encode as protobuf bytes.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>, ProviderError> {
        Ok(self.to_proto()?.encode_to_vec())
    }

    /// Decode protobuf bytes and validate.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProviderError> {
        Self::from_proto(generated::Blueprint::decode(bytes)?)
    }
}

fn collect_definitions<'a>(expr: &'a Expr, found: &mut Vec<(&'a str, AliasDefinition<'a>)>) {
    expr.visit(&mut |e| match e {
        Expr::ResourceIdentifier(id) => {
            found.push((id.alias.as_str(), AliasDefinition::Identifier(id)));
        }
        Expr::Provider(p) => found.push((p.alias.as_str(), AliasDefinition::Provider(p))),
        _ => {}
    });
}

// =========================================================================
// Wire conversion
// =========================================================================

impl From<&Source> for generated::Source {
    fn from(source: &Source) -> Self {
        use generated::source::Type;

        let kind = match source {
            Source::FilePath { path } => Type::FilePath(generated::FilePathSource {
                path: path.clone(),
            }),
            Source::GitHubRelease {
                repo_owner,
                repo_name,
                name,
            } => Type::GitHubRelease(generated::GitHubReleaseSource {
                repo_owner: repo_owner.clone(),
                repo_name: repo_name.clone(),
                name: name.clone(),
            }),
        };
        Self { r#type: Some(kind) }
    }
}

impl TryFrom<generated::Source> for Source {
    type Error = ProviderError;

    fn try_from(proto: generated::Source) -> Result<Self, Self::Error> {
        use generated::source::Type;

        match proto.r#type {
            Some(Type::FilePath(file)) => Ok(Source::FilePath { path: file.path }),
            Some(Type::GitHubRelease(release)) => Ok(Source::GitHubRelease {
                repo_owner: release.repo_owner,
                repo_name: release.repo_name,
                name: release.name,
            }),
            None => Err(ProviderError::internal("source has no type set")),
        }
    }
}

impl From<&Stmt> for generated::Stmt {
    fn from(stmt: &Stmt) -> Self {
        use generated::stmt::Type;

        let kind = match stmt {
            Stmt::Resource(resource) => Type::Resource(generated::ResourceStmt {
                expr: Some((&resource.expr).into()),
            }),
            Stmt::Build(build) => Type::Build(generated::BuildStmt {
                alias: build.alias.clone(),
                source: Some((&build.source).into()),
                translator: Some(generated::Translator {
                    source: Some((&build.translator.source).into()),
                    name: build.translator.name.clone(),
                }),
                config: build.config.iter().map(Into::into).collect(),
                runtime_config: Some((&build.runtime_config).into()),
            }),
        };
        Self { r#type: Some(kind) }
    }
}

impl TryFrom<generated::Stmt> for Stmt {
    type Error = ProviderError;

    fn try_from(proto: generated::Stmt) -> Result<Self, Self::Error> {
        use generated::stmt::Type;

        match proto.r#type {
            Some(Type::Resource(resource)) => {
                let expr = resource
                    .expr
                    .ok_or_else(|| ProviderError::internal("resource statement has no expression"))?;
                Ok(Stmt::Resource(ResourceStmt {
                    expr: expr.try_into()?,
                }))
            }
            Some(Type::Build(build)) => {
                let missing = |what: &str| {
                    ProviderError::internal(format!(
                        "build statement '{}' has no {}",
                        build.alias, what
                    ))
                };
                let source = build.source.ok_or_else(|| missing("source"))?;
                let translator = build.translator.ok_or_else(|| missing("translator"))?;
                let translator_source = translator
                    .source
                    .ok_or_else(|| missing("translator source"))?;

                Ok(Stmt::Build(BuildStmt {
                    source: source.try_into()?,
                    translator: TranslatorRef::new(translator_source.try_into()?, translator.name),
                    config: build
                        .config
                        .into_iter()
                        .map(Expr::try_from)
                        .collect::<Result<_, _>>()?,
                    runtime_config: build
                        .runtime_config
                        .map(Expr::try_from)
                        .transpose()?
                        .unwrap_or(Expr::Nil),
                    alias: build.alias,
                }))
            }
            None => Err(ProviderError::internal("statement has no type set")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ResourceExpr;

    fn gcp() -> ProviderExpr {
        ProviderExpr::new("gcp", "v0.0.1")
    }

    fn bucket_id() -> ResourceIdentifierExpr {
        ResourceIdentifierExpr::new("bucket", "bucket", Expr::map([("name", "x")]))
    }

    fn build() -> BuildStmt {
        BuildStmt::new(
            "network",
            Source::file_path("./network"),
            TranslatorRef::new(Source::github_release("acme", "translators", "go"), "go"),
        )
        .with_config(Expr::map([("cidr", "10.0.0.0/16")]))
        .with_runtime_config(Expr::runtime_config())
    }

    #[test]
    fn test_statement_order_survives_round_trip() {
        let object_id = ResourceIdentifierExpr::new(
            "object",
            "bucket_object",
            Expr::map([("bucket", bucket_id().to_expr()), ("name", "obj".to_expr())]),
        );

        let blueprint = Blueprint::new()
            .with_resource(ResourceExpr::new(gcp(), bucket_id(), Expr::Nil, true))
            .with_build(build())
            .with_resource(ResourceExpr::new(gcp(), object_id, Expr::Nil, false));

        let decoded = Blueprint::decode(&blueprint.encode_to_vec().unwrap()).unwrap();
        assert_eq!(decoded, blueprint);
        assert_eq!(decoded.len(), 3);
        assert!(matches!(decoded.stmts()[1], Stmt::Build(_)));
    }

    #[test]
    fn test_two_resources_with_one_alias_are_rejected() {
        let blueprint = Blueprint::new()
            .with_resource(ResourceExpr::new(gcp(), bucket_id(), Expr::Nil, true))
            .with_resource(ResourceExpr::new(gcp(), bucket_id(), Expr::Nil, true));

        match blueprint.validate() {
            Err(ProviderError::DuplicateAlias(alias)) => assert_eq!(alias, "bucket"),
            other => panic!("expected DuplicateAlias, got {:?}", other),
        }
        assert!(blueprint.encode_to_vec().is_err());
    }

    #[test]
    fn test_conflicting_alias_definitions_are_rejected() {
        let other = ResourceIdentifierExpr::new("bucket", "bucket", Expr::map([("name", "y")]));
        let object_id =
            ResourceIdentifierExpr::new("object", "bucket_object", Expr::map([("bucket", other)]));

        let blueprint = Blueprint::new()
            .with_resource(ResourceExpr::new(gcp(), bucket_id(), Expr::Nil, true))
            .with_resource(ResourceExpr::new(gcp(), object_id, Expr::Nil, true));
        assert!(matches!(
            blueprint.validate(),
            Err(ProviderError::DuplicateAlias(_))
        ));
    }

    #[test]
    fn test_provider_alias_must_stay_consistent() {
        let other = ResourceIdentifierExpr::new("other", "bucket", Expr::map([("name", "y")]));

        let consistent = Blueprint::new()
            .with_resource(ResourceExpr::new(gcp(), bucket_id(), Expr::Nil, true))
            .with_resource(ResourceExpr::new(gcp(), &other, Expr::Nil, true));
        assert!(consistent.validate().is_ok());

        let conflicting = Blueprint::new()
            .with_resource(ResourceExpr::new(gcp(), bucket_id(), Expr::Nil, true))
            .with_resource(ResourceExpr::new(
                ProviderExpr::new("gcp", "v0.0.2"),
                &other,
                Expr::Nil,
                true,
            ));
        assert!(conflicting.validate().is_err());
    }

    #[test]
    fn test_build_alias_shares_the_namespace() {
        let clash = ResourceIdentifierExpr::new("network", "vpc", Expr::map([("name", "x")]));
        let blueprint = Blueprint::new()
            .with_build(build())
            .with_resource(ResourceExpr::new(gcp(), clash, Expr::Nil, true));
        assert!(matches!(
            blueprint.validate(),
            Err(ProviderError::DuplicateAlias(alias)) if alias == "network"
        ));
    }

    #[test]
    fn test_get_resource_resolves_after_round_trip() {
        let object_id = ResourceIdentifierExpr::new(
            "object",
            "bucket_object",
            Expr::map([("bucket", Expr::get_resource("bucket"))]),
        );
        let blueprint = Blueprint::new()
            .with_resource(ResourceExpr::new(gcp(), bucket_id(), Expr::Nil, true))
            .with_resource(ResourceExpr::new(gcp(), object_id, Expr::Nil, true));

        let decoded = Blueprint::decode(&blueprint.encode_to_vec().unwrap()).unwrap();

        let Stmt::Resource(second) = &decoded.stmts()[1] else {
            panic!("expected a resource statement");
        };
        let mut alias = None;
        second.expr.visit(&mut |e| {
            if let Expr::GetResource(get) = e {
                alias = Some(get.alias.clone());
            }
        });
        let alias = alias.expect("reference should survive decoding");

        let resolved = decoded.resolve_alias(&alias).unwrap();
        assert_eq!(resolved, &bucket_id());
        assert_eq!(*resolved.value, Expr::map([("name", "x")]));
    }

    #[test]
    fn test_unknown_alias_does_not_resolve() {
        let blueprint =
            Blueprint::new().with_resource(ResourceExpr::new(gcp(), bucket_id(), Expr::Nil, true));
        assert!(blueprint.resolve_alias("missing").is_none());
        assert!(blueprint.resolve_alias("gcp").is_none());
    }

    #[test]
    fn test_malformed_statements_are_rejected() {
        let proto = generated::Blueprint {
            stmts: vec![generated::Stmt { r#type: None }],
        };
        assert!(Blueprint::from_proto(proto).is_err());

        let proto = generated::Blueprint {
            stmts: vec![generated::Stmt {
                r#type: Some(generated::stmt::Type::Build(generated::BuildStmt {
                    alias: "network".to_string(),
                    source: None,
                    translator: None,
                    config: vec![],
                    runtime_config: None,
                })),
            }],
        };
        let err = Blueprint::from_proto(proto).unwrap_err();
        assert!(err.to_string().contains("network"));
    }
}
