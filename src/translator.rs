//! The translator boundary.
//!
//! A translator turns consumer and schema programs into wire-format files
//! and turns schemas into language bindings. Hosts talk to translators only
//! through [`TranslatorService`]: every operation takes file paths and
//! reports success or failure.
//!
//! [`LocalTranslator`] runs blueprint and schema functions linked into the
//! current process, which is how Rust programs act as their own translator
//! and how tests drive the boundary without spawning anything.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::blueprint::Blueprint;
use crate::codec;
use crate::error::ProviderError;
use crate::expr::Expr;
use crate::schema::{ResourceSchema, Schema, StructSchema};

/// Name of the file [`LocalTranslator::generate_provider_sdk`] writes.
pub const TYPES_MANIFEST: &str = "types.json";

/// Name of the file [`LocalTranslator::generate_consumer_sdk`] writes.
pub const CONSUMER_TYPES_MANIFEST: &str = "consumer_types.json";

/// Operations a translator exposes to its host.
#[async_trait]
pub trait TranslatorService: Send + Sync + 'static {
    /// Run the schema program at `input_path` and write its schema to `output_path`.
    async fn translate_provider_schema(
        &self,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<(), ProviderError>;

    /// Generate provider bindings from the schema at `input_path` into `output_path`.
    async fn generate_provider_sdk(
        &self,
        input_path: &Path,
        output_path: &Path,
        args: &[String],
    ) -> Result<(), ProviderError>;

    /// Generate consumer bindings from the schema at `input_path` into `output_path`.
    async fn generate_consumer_sdk(
        &self,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<(), ProviderError>;

    /// Run the blueprint program at `input_path` with the config at
    /// `config_path` and write its blueprint to `output_path`.
    async fn translate_blueprint(
        &self,
        input_path: &Path,
        output_path: &Path,
        config_path: &Path,
    ) -> Result<(), ProviderError>;
}

type BlueprintFn = Box<dyn Fn(Vec<Expr>) -> Result<Blueprint, ProviderError> + Send + Sync>;
type SchemaFn = Box<dyn Fn() -> Result<Schema, ProviderError> + Send + Sync>;

/// A translator backed by in-process functions.
///
/// Input paths are ignored since the program is already linked in.
#[derive(Default)]
pub struct LocalTranslator {
    blueprint: Option<BlueprintFn>,
    schema: Option<SchemaFn>,
}

impl LocalTranslator {
    /// Create a translator with no programs registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the blueprint program.
    pub fn with_blueprint<F>(mut self, build: F) -> Self
    where
        F: Fn(Vec<Expr>) -> Result<Blueprint, ProviderError> + Send + Sync + 'static,
    {
        self.blueprint = Some(Box::new(build));
        self
    }

    /// Register the schema program.
    pub fn with_schema<F>(mut self, build: F) -> Self
    where
        F: Fn() -> Result<Schema, ProviderError> + Send + Sync + 'static,
    {
        self.schema = Some(Box::new(build));
        self
    }
}

#[async_trait]
impl TranslatorService for LocalTranslator {
    #[instrument(skip(self), name = "translator.translate_provider_schema")]
    async fn translate_provider_schema(
        &self,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<(), ProviderError> {
        let build = self
            .schema
            .as_ref()
            .ok_or_else(|| ProviderError::internal("no schema program registered"))?;
        codec::run_schema(output_path, build)?;
        Ok(())
    }

    /// Writes the struct types of every resource, keyed by resource type,
    /// as JSON. Rendering them into source code is left to the host's
    /// templates.
    #[instrument(skip(self), name = "translator.generate_provider_sdk")]
    async fn generate_provider_sdk(
        &self,
        input_path: &Path,
        output_path: &Path,
        args: &[String],
    ) -> Result<(), ProviderError> {
        write_manifest(
            input_path,
            &output_path.join(TYPES_MANIFEST),
            ResourceSchema::struct_types,
        )
    }

    /// Like [`LocalTranslator::generate_provider_sdk`], limited to the
    /// identifier and config types a consumer writes.
    #[instrument(skip(self), name = "translator.generate_consumer_sdk")]
    async fn generate_consumer_sdk(
        &self,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<(), ProviderError> {
        write_manifest(
            input_path,
            &output_path.join(CONSUMER_TYPES_MANIFEST),
            ResourceSchema::consumer_struct_types,
        )
    }

    #[instrument(skip(self), name = "translator.translate_blueprint")]
    async fn translate_blueprint(
        &self,
        input_path: &Path,
        output_path: &Path,
        config_path: &Path,
    ) -> Result<(), ProviderError> {
        let build = self
            .blueprint
            .as_ref()
            .ok_or_else(|| ProviderError::internal("no blueprint program registered"))?;
        codec::run_blueprint(config_path, output_path, build)?;
        Ok(())
    }
}

fn write_manifest<F>(input_path: &Path, path: &Path, collect: F) -> Result<(), ProviderError>
where
    F: Fn(&ResourceSchema) -> Result<BTreeMap<String, StructSchema>, ProviderError>,
{
    let schema = codec::read_schema(input_path)?;

    let mut manifest: BTreeMap<&str, Vec<StructSchema>> = BTreeMap::new();
    for resource in &schema.resources {
        let types = collect(resource)?;
        debug!(
            resource_type = %resource.resource_type,
            count = types.len(),
            "Collected struct types"
        );
        manifest.insert(&resource.resource_type, types.into_values().collect());
    }

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, serde_json::to_vec_pretty(&manifest)?)?;
    info!(path = %path.display(), resources = manifest.len(), "Wrote type manifest");
    Ok(())
}
